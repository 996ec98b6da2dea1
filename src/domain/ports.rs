use crate::domain::model::{Coordinate, PatientRecord, SubmissionDraft};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 自由文字地點 -> 座標；查無結果回傳 `Ok(None)`
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>>;
}

#[async_trait]
pub trait FormSubmitter: Send + Sync {
    async fn submit(&self, endpoint: &str, draft: &SubmissionDraft) -> Result<()>;
}

#[async_trait]
pub trait RecordArchive: Send + Sync {
    /// Key a record for `patient_name` would be stored under; fails if the
    /// name cannot be archived.
    fn key_for(&self, patient_name: &str) -> Result<String>;
    /// Returns the key the record was stored under.
    async fn store(&self, record: &PatientRecord) -> Result<String>;
    async fn fetch(&self, patient_name: &str) -> Result<Option<PatientRecord>>;
}
