use actuator_core::config::ExecutionConfig;
use actuator_core::{Action, Outcome};
use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::decode::decode;
use crate::error::OperationError;
use crate::runner::{ProcessRunner, ShellRunner};

/// Carries out decoded actions and reports each as an [`Outcome`].
///
/// Holds no per-call state; clones share the same process runner and can be
/// used from concurrent tasks.
#[derive(Clone)]
pub struct ActionExecutor {
    runner: Arc<dyn ProcessRunner>,
    working_dir: Option<PathBuf>,
}

impl ActionExecutor {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            working_dir: None,
        }
    }

    /// File actions and the shell runner share `execution.working_dir`.
    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self::new(Arc::new(ShellRunner::from_config(config)))
            .with_working_dir(config.working_dir.clone())
    }

    /// Base directory for relative `file_path`s. Does not affect the runner.
    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    fn resolve<'a>(&self, path: &'a str) -> Cow<'a, Path> {
        let path = Path::new(path);
        match &self.working_dir {
            Some(dir) if path.is_relative() => Cow::Owned(dir.join(path)),
            _ => Cow::Borrowed(path),
        }
    }

    /// Decode `raw` and execute the action it names.
    ///
    /// Decode failures never reach execution; they come back as error
    /// outcomes in the same vocabulary as execution failures.
    pub async fn execute_raw(&self, raw: &str) -> Outcome {
        match decode(raw) {
            Ok(action) => self.execute(action).await,
            Err(e) => {
                warn!(error = %e, "rejected action payload");
                e.into()
            }
        }
    }

    #[instrument(skip_all, fields(action = %action.kind()))]
    pub async fn execute(&self, action: Action) -> Outcome {
        match self.dispatch(action).await {
            Ok(outcome) => {
                info!("action succeeded");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "action failed");
                e.into()
            }
        }
    }

    async fn dispatch(&self, action: Action) -> Result<Outcome, OperationError> {
        match action {
            Action::CreateFile { path, content } => {
                write_file(&self.resolve(&path), &content)
                    .await
                    .map_err(OperationError::CreateFile)?;
                Ok(Outcome::success_message(format!(
                    "File '{}' created successfully.",
                    path
                )))
            }
            Action::AppendFile { path, content } => {
                append_file(&self.resolve(&path), &content)
                    .await
                    .map_err(OperationError::AppendFile)?;
                Ok(Outcome::success_message(format!(
                    "Content appended to '{}' successfully.",
                    path
                )))
            }
            Action::RunCommand { command } => {
                let output = self
                    .runner
                    .run(&command)
                    .await
                    .map_err(OperationError::Launch)?;

                if output.success {
                    Ok(Outcome::success_output(output.stdout))
                } else {
                    Err(OperationError::NonZeroExit {
                        code: output.exit_code,
                        stderr: output.stderr,
                    })
                }
            }
        }
    }
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(Arc::new(ShellRunner::new()))
    }
}

/// Truncating write. Parent directories are not created.
async fn write_file(path: &Path, content: &str) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}

async fn append_file(path: &Path, content: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}
