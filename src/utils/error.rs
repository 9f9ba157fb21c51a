use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Dataset error: {message}")]
    DatasetError { message: String },

    #[error("Training error: {message}")]
    TrainingError { message: String },

    #[error("Model '{code}' is not available at {path}")]
    ModelNotFound { code: String, path: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Model,
    Request,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AppError::CsvError(_) | AppError::DatasetError { .. } => ErrorCategory::Data,
            AppError::SerializationError(_)
            | AppError::TrainingError { .. }
            | AppError::ModelNotFound { .. } => ErrorCategory::Model,
            AppError::BadRequest { .. } => ErrorCategory::Request,
            AppError::IoError(_) | AppError::TemplateError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::BadRequest { .. } => ErrorSeverity::Low,
            AppError::ModelNotFound { .. } => ErrorSeverity::Medium,
            AppError::CsvError(_)
            | AppError::DatasetError { .. }
            | AppError::TrainingError { .. }
            | AppError::SerializationError(_)
            | AppError::ConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => ErrorSeverity::High,
            AppError::IoError(_) | AppError::TemplateError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AppError::ModelNotFound { code, .. } => {
                format!("Run `titanic-survival train --algorithm {}` first", code)
            }
            AppError::CsvError(_) | AppError::DatasetError { .. } => {
                "Check that the dataset is a Titanic CSV with a header row".to_string()
            }
            AppError::ConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => {
                "Fix the configuration file or the command-line flags".to_string()
            }
            AppError::SerializationError(_) => {
                "The model file may be corrupt; retrain it".to_string()
            }
            AppError::TrainingError { .. } => {
                "Make sure the dataset has both survivors and non-survivors".to_string()
            }
            AppError::BadRequest { .. } => "Check the submitted form fields".to_string(),
            AppError::IoError(_) => "Check file paths and permissions".to_string(),
            AppError::TemplateError(_) => "Check the page template".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Could not read the passenger dataset: {}", self),
            ErrorCategory::Model => format!("Model problem: {}", self),
            ErrorCategory::Request => format!("Invalid request: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
