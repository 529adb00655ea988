use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config file parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Email delivery failed: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("Email composition failed: {0}")]
    EmailError(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    AddressError(#[from] lettre::address::AddressError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Required column '{column}' is missing from the API response")]
    MissingColumnError { column: String },

    #[error("Blob storage request failed with status {status}: {message}")]
    StorageError { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Notification,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::MissingColumnError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) | EtlError::StorageError { .. } => ErrorCategory::Storage,
            EtlError::SmtpError(_) | EtlError::EmailError(_) | EtlError::AddressError(_) => {
                ErrorCategory::Notification
            }
            EtlError::TomlError(_)
            | EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Notification | ErrorCategory::Configuration => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(e) if e.is_timeout() => {
                "The DLD gateway did not answer in time; raise source.timeout_seconds or retry later"
            }
            EtlError::ApiError(_) => "Check network connectivity and the DLD gateway status",
            EtlError::MissingColumnError { .. } => {
                "The DLD response schema changed; update the column mapping"
            }
            EtlError::StorageError { status: 401 | 403, .. } => {
                "Verify azure_account_name and azure_account_key"
            }
            EtlError::StorageError { status: 404, .. } => {
                "Verify that azure_container_name exists in the storage account"
            }
            EtlError::StorageError { .. } => "Check the storage account status and retry",
            EtlError::IoError(_) => "Check that the snapshot directory exists and is writable",
            EtlError::SmtpError(_) => "Verify email_pw and the SMTP host settings",
            EtlError::EmailError(_) | EtlError::AddressError(_) => {
                "Check notify.sender and notify.recipient in the config file"
            }
            EtlError::MissingConfigError { .. } => {
                "Export the missing environment variable before starting the job"
            }
            EtlError::TomlError(_) => "Fix the syntax of the TOML config file",
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Correct the configuration value and rerun"
            }
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => {
                "Inspect the API response; the payload shape may have changed"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the DLD open-data API: {}", self),
            ErrorCategory::Data => format!("The transaction data could not be processed: {}", self),
            ErrorCategory::Storage => format!("Storing the transaction data failed: {}", self),
            ErrorCategory::Notification => format!("Sending the failure email failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
