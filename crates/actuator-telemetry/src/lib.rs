//! # Actuator Telemetry
//!
//! Structured logging for the Actuator binary. Console output always goes
//! to stderr so that stdout stays reserved for machine-readable outcomes.
//!
//! ```rust,no_run
//! use actuator_telemetry::{TelemetryConfig, TelemetrySystem};
//!
//! fn main() -> actuator_telemetry::Result<()> {
//!     let _guard = TelemetrySystem::init(TelemetryConfig::default())?;
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod system;

pub use config::{LogFormat, LogLevel, TelemetryConfig};
pub use system::{TelemetryGuard, TelemetrySystem};

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Telemetry-specific errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Telemetry system error: {message}")]
    System { message: String },
}
