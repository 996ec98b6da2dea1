use crate::config::toml_config::{FacilityEntry, ReferralConfig};
use crate::domain::model::{Facility, FacilityDirectory};
use crate::utils::error::{ReferralError, Result};
use std::io::Read;
use std::path::Path;

/// Reads a facility CSV with the header
/// `name,latitude,longitude,available_capacity,submission_endpoint`.
pub fn from_csv_reader<R: Read>(reader: R) -> Result<FacilityDirectory> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut facilities = Vec::new();
    for row in csv_reader.deserialize::<FacilityEntry>() {
        facilities.push(Facility::from(row?));
    }

    FacilityDirectory::new(facilities)
}

pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<FacilityDirectory> {
    let file = std::fs::File::open(&path)?;
    from_csv_reader(file)
}

/// 啟動時載入一次，之後唯讀
pub fn load_directory(config: &ReferralConfig) -> Result<FacilityDirectory> {
    let directory = match (&config.directory.path, &config.directory.facilities) {
        (Some(path), _) => {
            let resolved = config.resolve_path(path);
            tracing::debug!("Loading facility directory from {}", resolved.display());
            from_csv_path(&resolved)?
        }
        (None, Some(entries)) => {
            FacilityDirectory::new(entries.iter().cloned().map(Facility::from).collect())?
        }
        (None, None) => {
            return Err(ReferralError::MissingConfigError {
                field: "directory.path or directory.facilities".to_string(),
            })
        }
    };

    if directory.is_empty() {
        tracing::warn!("⚠️ Facility directory is empty; every referral will find no facility");
    } else {
        tracing::info!("🏥 Loaded {} facilities", directory.len());
    }
    Ok(directory)
}
