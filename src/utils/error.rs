use thiserror::Error;

pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect to the server.";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to download the report. Check the file formats.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Transport error: {0}")]
    TransportError(#[source] reqwest::Error),

    #[error("Server responded with HTTP {status}")]
    ServerError { status: u16, detail: Option<String> },

    #[error("Download failed: {reason}")]
    DownloadError { reason: String },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    #[error("A reconciliation request is already in flight")]
    RequestInFlight,

    #[error("Unknown reconciliation category: {value}")]
    UnknownCategory { value: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, ReconError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
    Server,
    Storage,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReconError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReconError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReconError::ValidationError { .. } | ReconError::RequestInFlight => {
                ErrorCategory::Validation
            }
            ReconError::TransportError(_) => ErrorCategory::Network,
            ReconError::ServerError { .. }
            | ReconError::DownloadError { .. }
            | ReconError::UnexpectedResponse { .. } => ErrorCategory::Server,
            ReconError::IoError(_) => ErrorCategory::Storage,
            ReconError::CsvError(_) => ErrorCategory::Data,
            ReconError::UnknownCategory { .. }
            | ReconError::ConfigError { .. }
            | ReconError::InvalidConfigValueError { .. }
            | ReconError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Server => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Message shown to the operator when an attempt ends in `Failed`.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ReconError::ValidationError { message } => message.clone(),
            ReconError::TransportError(_) => CONNECT_FAILED_MESSAGE.to_string(),
            ReconError::ServerError { detail, .. } => detail
                .clone()
                .filter(|detail| !detail.is_empty())
                .unwrap_or_else(|| CONNECT_FAILED_MESSAGE.to_string()),
            ReconError::DownloadError { .. } => DOWNLOAD_FAILED_MESSAGE.to_string(),
            ReconError::UnexpectedResponse { .. } => UNEXPECTED_MESSAGE.to_string(),
            ReconError::IoError(e) => format!("Failed to save the report: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => {
                "Select both ledger files and a reconciliation category, then submit again"
            }
            ErrorCategory::Network => "Check that the reconciliation service is reachable and retry",
            ErrorCategory::Server => {
                "Check the ledger file formats and the selected category, then resubmit"
            }
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Data => "The service returned data that could not be processed",
            ErrorCategory::Configuration => "Review the command-line flags and the TOML config file",
        }
    }
}
