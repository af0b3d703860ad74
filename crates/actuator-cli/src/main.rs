use actuator_core::config::Config;
use actuator_engine::ActionExecutor;
use actuator_orchestration::ActionPipeline;
use actuator_telemetry::{LogFormat, LogLevel, TelemetryConfig, TelemetrySystem};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "Outcomes are printed as JSON on stdout; logs go to stderr.\nExit status is 0 when every action succeeded and 1 otherwise."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path
    #[arg(long, global = true, help = "Path to configuration file")]
    config: Option<PathBuf>,

    /// Working directory to operate in
    #[arg(
        short = 'C',
        long = "cd",
        global = true,
        help = "Set working directory and validate it exists"
    )]
    working_dir: Option<PathBuf>,

    /// Kill commands that run longer than this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long, global = true, help = "Set log level")]
    log_level: Option<LogLevel>,

    /// Set log format (json, pretty, compact)
    #[arg(long, global = true, help = "Set log output format")]
    log_format: Option<LogFormat>,

    /// Enable file logging
    #[arg(long, global = true, help = "Enable logging to files")]
    file_logging: bool,

    /// Set log directory
    #[arg(long, global = true, help = "Directory for log files")]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a raw action payload
    Exec {
        /// Action JSON; read from stdin when absent or `-`
        raw: Option<String>,
    },
    /// Ask the model for one action and execute it
    Ask {
        /// What you want done, in plain language
        request: String,
    },
    /// Ask the model for a multi-step plan and execute it in order
    Plan {
        request: String,

        /// Skip remaining steps after the first failure
        #[arg(long)]
        stop_on_error: bool,
    },
}

/// Create telemetry configuration from CLI arguments
fn create_telemetry_config(cli: &Cli) -> TelemetryConfig {
    let mut config = TelemetryConfig::default();
    config.load_env_overrides();

    if let Some(level) = cli.log_level {
        config.level = level;
    }
    if let Some(format) = cli.log_format {
        config.format = format;
    }
    if cli.file_logging {
        config.file_enabled = true;
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
    }

    config
}

fn change_working_dir(working_dir: &Path) -> Result<()> {
    if !working_dir.is_dir() {
        error!(
            "Working directory does not exist or is not a directory: {}",
            working_dir.display()
        );
        anyhow::bail!(
            "Working directory does not exist or is not a directory: {}",
            working_dir.display()
        );
    }

    // Resolve symlinks and relative components before switching
    let canonical_dir = working_dir
        .canonicalize()
        .context("Failed to canonicalize working directory")?;
    std::env::set_current_dir(&canonical_dir).context("Failed to change to working directory")?;

    info!("Changed working directory to: {}", canonical_dir.display());
    Ok(())
}

/// Anchor a relative `--config` to the directory the user invoked us from.
fn resolve_config_path(config: Option<&Path>, invoked_from: &Path) -> Option<PathBuf> {
    config.map(|path| {
        if path.is_relative() {
            invoked_from.join(path)
        } else {
            path.to_path_buf()
        }
    })
}

async fn read_payload(raw: Option<String>) -> Result<String> {
    match raw {
        Some(raw) if raw != "-" => Ok(raw),
        _ => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read action payload from stdin")?;
            Ok(buffer)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables before parsing configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let _telemetry_guard = TelemetrySystem::init(create_telemetry_config(&cli))
        .map_err(|e| anyhow::anyhow!("Telemetry initialization failed: {}", e))?;

    let invoked_from = std::env::current_dir().context("Failed to read current directory")?;
    let config_path = resolve_config_path(cli.config.as_deref(), &invoked_from);

    if let Some(working_dir) = &cli.working_dir {
        change_working_dir(working_dir)?;
    }

    let mut config = Config::load(config_path.as_deref()).await.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;
    if let Some(seconds) = cli.timeout {
        config.execution.command_timeout_seconds = Some(seconds);
    }

    match cli.command {
        Command::Exec { raw } => {
            let payload = read_payload(raw).await?;
            let outcome = ActionExecutor::from_config(&config.execution)
                .execute_raw(&payload)
                .await;
            print_json(&outcome)?;
            Ok(exit_code(outcome.is_success()))
        }
        Command::Ask { request } => {
            let pipeline = ActionPipeline::from_config(&config)?;
            let response = pipeline.handle(&request).await.map_err(|e| {
                error!("Request failed: {}", e);
                anyhow::anyhow!("Request failed: {}", e)
            })?;
            print_json(&response)?;
            Ok(exit_code(response.outcome.is_success()))
        }
        Command::Plan {
            request,
            stop_on_error,
        } => {
            let pipeline = ActionPipeline::from_config(&config)?
                .stop_on_error(stop_on_error || config.execution.stop_on_error);
            let response = pipeline.handle_plan(&request).await.map_err(|e| {
                error!("Plan request failed: {}", e);
                anyhow::anyhow!("Plan request failed: {}", e)
            })?;
            info!(
                succeeded = response.report.succeeded(),
                failed = response.report.failed(),
                skipped = response.report.skipped(),
                "plan finished"
            );
            print_json(&response)?;
            Ok(exit_code(response.report.is_success()))
        }
    }
}
