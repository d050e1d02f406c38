use crate::domain::model::Stage;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Service responded with {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("No input file supplied")]
    NoInput,

    #[error("Input file not found: {name}")]
    InputNotFound { name: String },

    #[error("Input file name '{name}' is outside the upload directory")]
    InvalidInputName { name: String },

    #[error("Failed to parse tabular input: {message}")]
    ParseError { message: String },

    #[error("Failed to create destination tab '{tab}': {message}")]
    DestinationCreateError { tab: String, message: String },

    #[error("Failed to write destination tab '{tab}': {message}")]
    DestinationWriteError { tab: String, message: String },

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Destination,
    Configuration,
    Internal,
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
            EtlError::NoInput
            | EtlError::InputNotFound { .. }
            | EtlError::InvalidInputName { .. }
            | EtlError::ParseError { .. } => ErrorCategory::Input,
            EtlError::ApiError(_) | EtlError::ServiceError { .. } => ErrorCategory::Network,
            EtlError::DestinationCreateError { .. } | EtlError::DestinationWriteError { .. } => {
                ErrorCategory::Destination
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Destination => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 終止性失敗所屬的階段；讀取階段的 IO 錯誤也歸在 read
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EtlError::ParseError { .. }
            | EtlError::InvalidInputName { .. }
            | EtlError::IoError(_) => Some(Stage::Read),
            EtlError::DestinationCreateError { .. } | EtlError::DestinationWriteError { .. } => {
                Some(Stage::Sheet)
            }
            _ => None,
        }
    }

    /// 對外回應使用的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self {
            EtlError::NoInput => 400,
            EtlError::InputNotFound { .. } => 404,
            _ => 500,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::NoInput => "No file uploaded".to_string(),
            EtlError::InputNotFound { name } => format!("File not found: {}", name),
            EtlError::ParseError { .. } | EtlError::InvalidInputName { .. } => {
                "Failed to read the uploaded file".to_string()
            }
            EtlError::DestinationCreateError { .. } => {
                "Failed to create a new sheet for the results".to_string()
            }
            EtlError::DestinationWriteError { .. } => {
                "Failed to write results to the sheet".to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => "Invalid configuration".to_string(),
            EtlError::IoError(_) => match self.stage() {
                Some(Stage::Read) => "Failed to read the uploaded file".to_string(),
                _ => "Unexpected error".to_string(),
            },
            _ => "Unexpected error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check that the file exists and is valid delimited text with a header row",
            ErrorCategory::Network => "Check the service endpoint and API key, then try again",
            ErrorCategory::Destination => {
                "Check the spreadsheet id and access token; a created tab may need manual removal"
            }
            ErrorCategory::Configuration => "Fix the configuration file and restart",
            ErrorCategory::Internal => "Inspect the logs for details",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.user_friendly_message(),
            detail: self.to_string(),
            stage: self.stage(),
        }
    }
}

/// 終止性失敗的 JSON 回應內容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

pub type Result<T> = std::result::Result<T, EtlError>;
