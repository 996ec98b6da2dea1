use crate::core::route::DEFAULT_MAPS_BASE_URL;
use crate::domain::model::Facility;
use crate::utils::error::{ReferralError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_timeout_seconds,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralConfig {
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    pub archive: ArchiveConfig,
    pub routing: Option<RoutingConfig>,
    pub directory: DirectoryConfig,
    /// 設定檔所在目錄，用來解析相對路徑
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionConfig {
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    #[serde(default)]
    pub fields: FormFieldMap,
}

/// Intake form field names for each draft value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFieldMap {
    pub patient_name: String,
    pub blood_pressure: String,
    pub temperature: String,
    pub pulse_rate: String,
    pub oxygen_saturation: String,
    pub respiratory_rate: String,
    pub summary: String,
}

impl Default for FormFieldMap {
    fn default() -> Self {
        Self {
            patient_name: "patient_name".to_string(),
            blood_pressure: "blood_pressure".to_string(),
            temperature: "temperature".to_string(),
            pulse_rate: "pulse_rate".to_string(),
            oxygen_saturation: "oxygen_saturation".to_string(),
            respiratory_rate: "respiratory_rate".to_string(),
            summary: "summary".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub maps_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub path: Option<String>,
    pub facilities: Option<Vec<FacilityEntry>>,
}

/// `[[directory.facilities]]` / CSV 共用的列格式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityEntry {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub available_capacity: u32,
    pub submission_endpoint: String,
}

impl From<FacilityEntry> for Facility {
    fn from(entry: FacilityEntry) -> Self {
        Facility {
            name: entry.name,
            location: crate::domain::model::Coordinate::new(entry.latitude, entry.longitude),
            available_capacity: entry.available_capacity,
            submission_endpoint: entry.submission_endpoint,
        }
    }
}

impl SubmissionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts.unwrap_or(0)
    }

    /// First attempt plus retries.
    pub fn max_attempts(&self) -> u32 {
        self.retry_attempts().saturating_add(1)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds.unwrap_or(1))
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl ReferralConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReferralError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReferralError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FORM_ENDPOINT})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReferralError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("geocoder.endpoint", &self.geocoder.endpoint)?;
        validate_non_empty_string("geocoder.user_agent", &self.geocoder.user_agent)?;
        validate_timeout_seconds("geocoder.timeout_seconds", self.geocoder.timeout_seconds)?;
        validate_timeout_seconds("submission.timeout_seconds", self.submission.timeout_seconds)?;

        validate_path("archive.path", &self.archive.path)?;
        validate_url("routing.maps_base_url", self.maps_base_url())?;

        match (&self.directory.path, &self.directory.facilities) {
            (Some(path), None) => {
                validate_path("directory.path", path)?;
                validate_file_extension("directory.path", path, &["csv"])?;
            }
            (None, Some(_)) => {}
            (Some(_), Some(_)) => {
                return Err(ReferralError::ConfigValidationError {
                    field: "directory".to_string(),
                    message: "set either 'path' or 'facilities', not both".to_string(),
                })
            }
            (None, None) => {
                return Err(ReferralError::MissingConfigError {
                    field: "directory.path or directory.facilities".to_string(),
                })
            }
        }

        Ok(())
    }

    pub fn maps_base_url(&self) -> &str {
        self.routing
            .as_ref()
            .and_then(|r| r.maps_base_url.as_deref())
            .unwrap_or(DEFAULT_MAPS_BASE_URL)
    }

    /// 相對路徑以設定檔目錄為基準
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.resolve_path(&self.archive.path)
    }
}

impl Validate for ReferralConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[geocoder]
endpoint = "https://nominatim.openstreetmap.org/search"
user_agent = "vital-referral-test"

[archive]
path = "./records"

[directory]
path = "facilities.csv"
"#;

    #[test]
    fn test_parse_basic_config_with_defaults() {
        let config = ReferralConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.geocoder.user_agent, "vital-referral-test");
        assert_eq!(config.submission.retry_attempts(), 0);
        assert_eq!(config.submission.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.submission.fields, FormFieldMap::default());
        assert_eq!(config.maps_base_url(), DEFAULT_MAPS_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inline_facilities_and_field_overrides() {
        let toml_content = r#"
[geocoder]
endpoint = "https://geo.example.com/search"
user_agent = "test"
timeout_seconds = 5

[submission]
retry_attempts = 3
retry_delay_seconds = 0

[submission.fields]
patient_name = "entry.1001"
summary = "entry.1007"

[archive]
path = "./records"

[routing]
maps_base_url = "https://maps.example.com/dir"

[[directory.facilities]]
name = "Korle Bu Teaching Hospital"
latitude = 5.5381
longitude = -0.2272
available_capacity = 2
submission_endpoint = "https://forms.example.com/korle-bu"
"#;

        let config = ReferralConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.submission.fields.patient_name, "entry.1001");
        assert_eq!(config.submission.fields.summary, "entry.1007");
        assert_eq!(config.submission.fields.pulse_rate, "pulse_rate");
        assert_eq!(config.submission.retry_delay(), Duration::ZERO);
        assert_eq!(config.maps_base_url(), "https://maps.example.com/dir");

        let facilities = config.directory.facilities.unwrap();
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].available_capacity, 2);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("VITAL_REFERRAL_TEST_GEOCODER", "https://geo.test.com/search");

        let toml_content = BASIC.replace(
            "https://nominatim.openstreetmap.org/search",
            "${VITAL_REFERRAL_TEST_GEOCODER}",
        );
        let config = ReferralConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.geocoder.endpoint, "https://geo.test.com/search");

        std::env::remove_var("VITAL_REFERRAL_TEST_GEOCODER");
    }

    #[test]
    fn test_directory_source_is_required() {
        let toml_content = BASIC.replace("path = \"facilities.csv\"", "");
        let config = ReferralConfig::from_toml_str(&toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ReferralError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_directory_must_be_csv() {
        let toml_content = BASIC.replace("facilities.csv", "facilities.xlsx");
        let config = ReferralConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_geocoder_endpoint() {
        let toml_content = BASIC.replace("https://nominatim.openstreetmap.org/search", "nominatim");
        let config = ReferralConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relative_paths_resolve_against_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = ReferralConfig::from_file(temp_file.path()).unwrap();
        let base = temp_file.path().parent().unwrap();

        assert_eq!(config.archive_path(), base.join("./records"));
        assert_eq!(config.resolve_path("facilities.csv"), base.join("facilities.csv"));
    }

    #[test]
    fn test_max_attempts_saturates() {
        let mut submission = SubmissionConfig::default();
        assert_eq!(submission.max_attempts(), 1);

        submission.retry_attempts = Some(2);
        assert_eq!(submission.max_attempts(), 3);

        submission.retry_attempts = Some(u32::MAX);
        assert_eq!(submission.max_attempts(), u32::MAX);
    }
}
