use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded: {message}, retry after: {retry_after:?}s")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Server error: {status_code}, message: {message}")]
    ServerError { status_code: u16, message: String },

    #[error("Network timeout: {message}")]
    Timeout { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("Unknown provider error: {message}")]
    Unknown { message: String },
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RateLimit { .. } => true,
            ProviderError::ServerError { status_code, .. } => *status_code >= 500,
            ProviderError::Timeout { .. } => true,
            ProviderError::Http(_) => true,
            _ => false,
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimit { retry_after, .. } => *retry_after,
            ProviderError::ServerError { status_code, .. } if *status_code >= 500 => Some(1),
            _ => None,
        }
    }

    /// Map a non-success HTTP status and the extracted error message onto a
    /// variant. Shared by every HTTP backend.
    pub fn from_status(status_code: u16, message: String, model: &str) -> Self {
        match status_code {
            401 | 403 => ProviderError::Authentication { message },
            404 => ProviderError::ModelNotFound {
                model: model.to_string(),
            },
            408 => ProviderError::Timeout { message },
            429 => ProviderError::RateLimit {
                message,
                retry_after: None,
            },
            400..=499 => ProviderError::InvalidRequest { message },
            500..=599 => ProviderError::ServerError {
                status_code,
                message,
            },
            _ => ProviderError::Unknown {
                message: format!("HTTP {}: {}", status_code, message),
            },
        }
    }
}

impl From<ProviderError> for actuator_core::ActuatorError {
    fn from(err: ProviderError) -> Self {
        actuator_core::ActuatorError::Provider {
            message: err.to_string(),
        }
    }
}
