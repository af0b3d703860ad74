use actuator_core::config::ExecutionConfig;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a command string through some subordinate process.
///
/// `Err` means the command could not be run to completion at all (the shell
/// failed to launch, or a timeout stopped it). A command that ran and exited
/// non-zero is an `Ok` output with `success == false`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &str) -> io::Result<ProcessOutput>;
}

/// Runs commands through a shell, e.g. `sh -c "<command>"`.
///
/// The command string is passed to the shell untouched: no allow-list, no
/// escaping. Whoever builds the runner decides what may reach it.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    shell_flag: String,
    timeout: Option<Duration>,
    working_dir: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::from_config(&ExecutionConfig::default())
    }

    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            shell_flag: config.shell_flag.clone(),
            timeout: config.command_timeout(),
            working_dir: config.working_dir.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, working_dir: Option<PathBuf>) -> Self {
        self.working_dir = working_dir;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for ShellRunner {
    async fn run(&self, command: &str) -> io::Result<ProcessOutput> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg(&self.shell_flag).arg(command);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // A timed-out child is dropped with its future and must not linger
        cmd.kill_on_drop(true);

        debug!(shell = %self.shell, command, "spawning command");
        let child = cmd.spawn()?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("command timed out after {:?}", limit),
                    )
                })??,
            None => child.wait_with_output().await?,
        };

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
