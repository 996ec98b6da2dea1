use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferralError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Duplicate facility in directory: {name}")]
    DuplicateFacility { name: String },

    #[error("Geocoding failed: {message}")]
    GeocodingError { message: String },

    #[error("Submission to {endpoint} failed: {message}")]
    SubmissionError { endpoint: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Storage,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReferralError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::GeocodingError { .. } | Self::SubmissionError { .. } => {
                ErrorCategory::Network
            }
            Self::CsvError(_) | Self::SerializationError(_) | Self::DuplicateFacility { .. } => {
                ErrorCategory::Data
            }
            Self::IoError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路問題通常可以重試
            Self::HttpError(_) | Self::GeocodingError { .. } | Self::SubmissionError { .. } => {
                ErrorSeverity::Medium
            }
            Self::ValidationError { .. }
            | Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::DuplicateFacility { .. }
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::HttpError(_) => "Check your network connection and try again".to_string(),
            Self::GeocodingError { .. } => {
                "Check the geocoder endpoint and try a more specific location".to_string()
            }
            Self::SubmissionError { endpoint, .. } => {
                format!("Verify that the intake form at {} is reachable", endpoint)
            }
            Self::CsvError(_) => {
                "Check the facility directory CSV header and row values".to_string()
            }
            Self::DuplicateFacility { name } => {
                format!("Remove or rename the duplicate entry '{}'", name)
            }
            Self::SerializationError(_) => {
                "The archived record may be corrupted; re-record the vitals".to_string()
            }
            Self::IoError(_) => "Check file permissions and available disk space".to_string(),
            Self::ConfigError { .. } | Self::ConfigValidationError { .. } => {
                "Review the configuration file syntax".to_string()
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' in the configuration", field)
            }
            Self::MissingConfigError { field } => {
                format!("Add '{}' to the configuration", field)
            }
            Self::ValidationError { .. } => "Correct the input and try again".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach an external service: {}", self),
            ErrorCategory::Data => format!("Facility or record data is invalid: {}", self),
            ErrorCategory::Storage => format!("Could not access local storage: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Validation => format!("Invalid input: {}", self),
        }
    }

    /// 檔案不存在時 archive 視為「查無記錄」
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IoError(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, ReferralError>;
