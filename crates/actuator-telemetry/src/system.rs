//! Subscriber installation

use crate::config::{LogFormat, TelemetryConfig};
use crate::{Error, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global `tracing` subscriber.
pub struct TelemetrySystem;

/// Keeps the background file writer alive; buffered events are flushed
/// when it is dropped.
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

impl TelemetrySystem {
    /// Initialize logging with the given configuration. Fails if a global
    /// subscriber is already installed.
    pub fn init(config: TelemetryConfig) -> Result<TelemetryGuard> {
        config.validate()?;

        let filter = Self::build_env_filter(&config)?;
        let mut layers: Vec<BoxedLayer> = vec![Self::build_console_layer(&config)];

        let file_guard = match Self::build_file_layer(&config) {
            Some((layer, guard)) => {
                layers.push(layer);
                Some(guard)
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .map_err(|e| Error::System {
                message: format!("Failed to initialize tracing subscriber: {}", e),
            })?;

        tracing::debug!(
            telemetry.event = "system_initialized",
            telemetry.version = env!("CARGO_PKG_VERSION"),
            file_logging = config.file_enabled,
            "Telemetry system initialized"
        );

        Ok(TelemetryGuard {
            _file_guard: file_guard,
        })
    }

    /// Configured level plus quiet HTTP internals; `RUST_LOG` replaces both.
    pub fn build_env_filter(config: &TelemetryConfig) -> Result<EnvFilter> {
        if let Ok(env_filter) = std::env::var("RUST_LOG") {
            return EnvFilter::try_new(&env_filter).map_err(|e| Error::Config {
                message: format!("Invalid RUST_LOG '{}': {}", env_filter, e),
            });
        }

        let level: Level = config.level.into();
        let mut filter = EnvFilter::new(level.to_string());

        for directive in ["hyper=warn", "reqwest=warn", "h2=warn"] {
            filter = filter.add_directive(directive.parse().map_err(|e| Error::Config {
                message: format!("Invalid filter directive '{}': {}", directive, e),
            })?);
        }

        Ok(filter)
    }

    /// Console output goes to stderr; stdout belongs to command results.
    fn build_console_layer(config: &TelemetryConfig) -> BoxedLayer {
        let location = config.include_location;

        match config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(false)
                .with_target(true)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
        }
    }

    /// Daily rolling file, written from a background thread.
    fn build_file_layer(config: &TelemetryConfig) -> Option<(BoxedLayer, WorkerGuard)> {
        if !config.file_enabled {
            return None;
        }

        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let location = config.include_location;

        let layer = match config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(false)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
            LogFormat::Pretty | LogFormat::Compact => fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
        };

        Some((layer, guard))
    }
}
