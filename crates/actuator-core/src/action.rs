use serde::{Deserialize, Serialize};
use std::fmt;

/// A single side-effecting operation requested by the model.
///
/// Fields are carried exactly as decoded: paths are not normalized and
/// commands are not escaped or filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateFile { path: String, content: String },
    AppendFile { path: String, content: String },
    RunCommand { command: String },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateFile { .. } => ActionKind::CreateFile,
            Action::AppendFile { .. } => ActionKind::AppendFile,
            Action::RunCommand { .. } => ActionKind::RunCommand,
        }
    }
}

/// Discriminator values accepted in the `action` field of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateFile,
    #[serde(rename = "append_to_file")]
    AppendFile,
    RunCommand,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [
        ActionKind::CreateFile,
        ActionKind::AppendFile,
        ActionKind::RunCommand,
    ];

    /// Wire name used in the `action` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateFile => "create_file",
            ActionKind::AppendFile => "append_to_file",
            ActionKind::RunCommand => "run_command",
        }
    }

    /// Fields a payload of this kind must carry besides `action`.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ActionKind::CreateFile | ActionKind::AppendFile => &["file_path", "content"],
            ActionKind::RunCommand => &["command"],
        }
    }

    /// Matches a wire name exactly. Case and surrounding whitespace count.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Result of attempting one action.
///
/// Exactly one of `message` and `output` is set. `output` is only used for
/// successful commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Outcome {
    pub fn success_message(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: Some(message.into()),
            output: None,
        }
    }

    pub fn success_output(output: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: None,
            output: Some(output.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            message: Some(message.into()),
            output: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// The human-readable detail, whichever field carries it.
    pub fn detail(&self) -> &str {
        self.message
            .as_deref()
            .or(self.output.as_deref())
            .unwrap_or_default()
    }
}
