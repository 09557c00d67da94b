use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("Invalid request type: {0}")]
    InvalidRequestKind(String),

    #[error("Invalid {kind} payload: {message}")]
    InvalidPayload { kind: String, message: String },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("{variable} is not configured")]
    MissingCredential { variable: String },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Configuration,
    Upstream,
    Internal,
}

impl AdviceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdviceError::InvalidRequestKind(_)
            | AdviceError::InvalidPayload { .. }
            | AdviceError::MalformedBody(_)
            | AdviceError::MethodNotAllowed(_) => ErrorCategory::Client,
            AdviceError::MissingCredential { .. }
            | AdviceError::ConfigError { .. }
            | AdviceError::InvalidConfigValue { .. }
            | AdviceError::MissingConfig { .. } => ErrorCategory::Configuration,
            AdviceError::Transport(_) => ErrorCategory::Upstream,
            AdviceError::Io(_) => ErrorCategory::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AdviceError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ if self.category() == ErrorCategory::Client => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to return over HTTP. Configuration details such as
    /// environment variable names stay in the server log.
    pub fn client_message(&self) -> String {
        match self.category() {
            ErrorCategory::Client => self.to_string(),
            ErrorCategory::Configuration => "AI service is not configured".to_string(),
            ErrorCategory::Upstream => "AI service error".to_string(),
            ErrorCategory::Internal => "Internal error".to_string(),
        }
    }

    pub(crate) fn invalid_payload(kind: &str, message: impl Into<String>) -> Self {
        AdviceError::InvalidPayload {
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdviceError>;
