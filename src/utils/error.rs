use crate::core::http::TransientFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Query error: {0}")]
    QueryError(#[from] rusqlite::Error),

    #[error("time data '{value}' does not match format '{format}'")]
    DateFormatError { value: String, format: String },

    #[error("Given date of birth is in future: {dob}")]
    FutureDateError { dob: String },

    #[error("Extraction from {url} failed: {message}")]
    FatalExtractionError {
        url: String,
        message: String,
        #[source]
        source: Option<TransientFailure>,
    },

    #[error("Table '{table}' has no rows to analyze")]
    EmptyDatasetError { table: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::FatalExtractionError { .. } => ErrorCategory::Network,
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            EtlError::DateFormatError { .. }
            | EtlError::FutureDateError { .. }
            | EtlError::EmptyDatasetError { .. }
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) | EtlError::QueryError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) | EtlError::FatalExtractionError { .. } => {
                "Check that the upstream API is reachable and re-run the pipeline"
            }
            EtlError::DateFormatError { .. } => "Use dates in YYYY-MM-DD format",
            EtlError::FutureDateError { .. } => {
                "Upstream returned a birthday in the future; inspect the source data"
            }
            EtlError::EmptyDatasetError { .. } => {
                "No records were extracted; widen the date range or raise import_data_size"
            }
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and try again"
            }
            EtlError::QueryError(_) => "Inspect the analysis SQL against the loaded columns",
            EtlError::IoError(_) => "Check file paths and permissions",
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Inspect the upstream payload shape"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not extract data from the API: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Data error: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
