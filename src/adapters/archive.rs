use crate::domain::model::PatientRecord;
use crate::domain::ports::{RecordArchive, Storage};
use crate::utils::error::{ReferralError, Result};
use async_trait::async_trait;
use url::form_urlencoded;

/// Stores each patient as a JSON record plus a readable text document.
pub struct DocumentArchive<S: Storage> {
    storage: S,
}

impl<S: Storage> DocumentArchive<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

/// 病患姓名轉成檔名：修剪後以 form-urlencoded 編碼，不同姓名不會共用 key
pub fn archive_key(patient_name: &str) -> Result<String> {
    let name = patient_name.trim();
    if name.is_empty() {
        return Err(ReferralError::ValidationError {
            message: "patient name cannot be empty".to_string(),
        });
    }
    Ok(form_urlencoded::byte_serialize(name.as_bytes()).collect())
}

fn record_file(key: &str) -> String {
    format!("{}_vital_signs.json", key)
}

fn document_file(key: &str) -> String {
    format!("{}_vital_signs.txt", key)
}

pub fn render_document(record: &PatientRecord) -> String {
    let vitals = &record.vitals;
    let mut lines = vec![
        format!("Patient Vital Signs - {}", record.patient_name),
        String::new(),
        format!("Patient Name: {}", record.patient_name),
        format!("Blood pressure (mmHg): {}", vitals.blood_pressure),
        format!("Temperature: {}", vitals.temperature),
        format!("Pulse rate: {}", vitals.pulse_rate),
        format!("Oxygen Saturation: {}", vitals.oxygen_saturation),
        format!("Respiratory rate: {}", vitals.respiratory_rate),
        format!("Summary of condition: {}", record.summary),
    ];
    if let Some(facility) = &record.referred_to {
        lines.push(format!("Referred to: {}", facility));
    }
    lines.push(format!("Recorded at: {}", record.recorded_at.to_rfc3339()));

    let mut document = lines.join("\n");
    document.push('\n');
    document
}

#[async_trait]
impl<S: Storage> RecordArchive for DocumentArchive<S> {
    fn key_for(&self, patient_name: &str) -> Result<String> {
        archive_key(patient_name)
    }

    async fn store(&self, record: &PatientRecord) -> Result<String> {
        let key = archive_key(&record.patient_name)?;

        let json = serde_json::to_vec_pretty(record)?;
        self.storage.write_file(&record_file(&key), &json).await?;

        let document = render_document(record);
        self.storage
            .write_file(&document_file(&key), document.as_bytes())
            .await?;

        tracing::debug!("Wrote {} ({} bytes)", record_file(&key), json.len());
        Ok(key)
    }

    async fn fetch(&self, patient_name: &str) -> Result<Option<PatientRecord>> {
        let key = archive_key(patient_name)?;

        match self.storage.read_file(&record_file(&key)).await {
            Ok(bytes) => {
                let record: PatientRecord = serde_json::from_slice(&bytes)?;
                // 檔案可能由其他姓名寫入
                if record.patient_name != patient_name.trim() {
                    tracing::warn!(
                        "Record {} belongs to '{}', not '{}'",
                        record_file(&key),
                        record.patient_name,
                        patient_name.trim()
                    );
                    return Ok(None);
                }
                Ok(Some(record))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
