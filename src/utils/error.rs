use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Network unreachable: {message}")]
    NetworkError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Sign-in required to {action}")]
    AuthRequiredError { action: String },

    #[error("Evaluation job failed: {message}")]
    JobFailedError { message: String },

    #[error("A comparison job is already in flight")]
    JobInFlightError,

    #[error("Evaluation did not finish within {attempts} status checks")]
    TimedOutError { attempts: u32 },

    #[error("Comparison was cancelled")]
    CancelledError,

    #[error("History operation failed: {message}")]
    PersistenceError { message: String },

    #[error("Export failed: {message}")]
    ExportError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Validation,
    Auth,
    Network,
    Job,
    Persistence,
    Export,
    System,
}

impl CompareError {
    /// Transient errors are absorbed by the polling loop and never shown to
    /// the user; everything else is terminal for the operation that raised it.
    pub fn is_transient(&self) -> bool {
        matches!(self, CompareError::NetworkError { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CompareError::InvalidConfigValueError { .. } | CompareError::MissingConfigError { .. } => {
                ErrorCategory::Config
            }
            CompareError::ValidationError { .. } | CompareError::JobInFlightError => {
                ErrorCategory::Validation
            }
            CompareError::AuthRequiredError { .. } => ErrorCategory::Auth,
            CompareError::NetworkError { .. } | CompareError::ApiError(_) => ErrorCategory::Network,
            CompareError::JobFailedError { .. }
            | CompareError::TimedOutError { .. }
            | CompareError::CancelledError => ErrorCategory::Job,
            CompareError::PersistenceError { .. } => ErrorCategory::Persistence,
            CompareError::ExportError { .. } | CompareError::CsvError(_) => ErrorCategory::Export,
            CompareError::IoError(_) | CompareError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CompareError::ValidationError { .. }
            | CompareError::JobInFlightError
            | CompareError::CancelledError => ErrorSeverity::Low,
            CompareError::NetworkError { .. }
            | CompareError::TimedOutError { .. }
            | CompareError::PersistenceError { .. }
            | CompareError::AuthRequiredError { .. } => ErrorSeverity::Medium,
            CompareError::ApiError(_)
            | CompareError::JobFailedError { .. }
            | CompareError::ExportError { .. }
            | CompareError::CsvError(_)
            | CompareError::InvalidConfigValueError { .. }
            | CompareError::MissingConfigError { .. } => ErrorSeverity::High,
            CompareError::IoError(_) | CompareError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CompareError::ValidationError { message } => message.clone(),
            CompareError::AuthRequiredError { action } => {
                format!("You need to sign in to {}", action)
            }
            CompareError::JobFailedError { message } => {
                format!("The evaluation service reported a failure: {}", message)
            }
            CompareError::TimedOutError { .. } => {
                "The evaluation is taking too long; giving up for now".to_string()
            }
            CompareError::CancelledError => "Comparison cancelled".to_string(),
            CompareError::JobInFlightError => {
                "A comparison is already running; wait for it to finish".to_string()
            }
            CompareError::PersistenceError { message } => {
                format!("Could not update saved comparisons: {}", message)
            }
            CompareError::ExportError { message } => format!("Could not export: {}", message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Config => "Check the CLI flags and the comparison profile file",
            ErrorCategory::Validation => "Adjust the categories/colleges and try again",
            ErrorCategory::Auth => "Provide an API token via --api-token or COMPARE_API_TOKEN",
            ErrorCategory::Network => "Check connectivity to the comparison service and retry",
            ErrorCategory::Job => "Re-submit the comparison; the previous job was not kept",
            ErrorCategory::Persistence => "Retry the history operation; saved data was not rolled back",
            ErrorCategory::Export => "Verify the output path is writable and retry the export",
            ErrorCategory::System => "Inspect the logs; this is likely an environment problem",
        }
    }
}

pub type Result<T> = std::result::Result<T, CompareError>;
