use thiserror::Error;

pub type Result<T> = std::result::Result<T, ActuatorError>;

#[derive(Error, Debug)]
pub enum ActuatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to load configuration from '{path}': {source}")]
    ConfigLoadFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Provider error: {message}")]
    Provider { message: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}
