//! Telemetry configuration

use crate::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Also write to a daily rolling file under `log_dir`
    pub file_enabled: bool,
    pub log_dir: PathBuf,
    /// Base filename; the date is appended on rotation
    pub log_file_name: String,
    /// Include source file and line in each event
    pub include_location: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Level::from(*self))
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON format
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        let log_dir = Self::default_log_dir().unwrap_or_else(|_| PathBuf::from("./logs"));

        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            file_enabled: false,
            log_dir,
            log_file_name: "actuator.log".to_string(),
            include_location: false,
        }
    }
}

impl TelemetryConfig {
    /// Load environment variable overrides
    pub fn load_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("ACTUATOR_LOG_LEVEL") {
            self.level = level.parse().unwrap_or(self.level);
        }

        if let Ok(format) = std::env::var("ACTUATOR_LOG_FORMAT") {
            self.format = format.parse().unwrap_or(self.format);
        }

        if let Ok(enabled) = std::env::var("ACTUATOR_FILE_LOGGING") {
            self.file_enabled = enabled.parse().unwrap_or(self.file_enabled);
        }

        if let Ok(dir) = std::env::var("ACTUATOR_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
    }

    /// Get default log directory
    pub fn default_log_dir() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("com", "actuator", "actuator").ok_or_else(|| Error::Config {
                message: "Could not determine log directory".to_string(),
            })?;

        Ok(project_dirs.data_local_dir().join("logs"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.file_enabled {
            if self.log_file_name.is_empty() {
                return Err(Error::Config {
                    message: "log_file_name must not be empty".to_string(),
                });
            }

            if !self.log_dir.exists() {
                std::fs::create_dir_all(&self.log_dir)?;
            }
        }

        Ok(())
    }
}
