use actuator_core::{ActionKind, Outcome};
use std::io;
use thiserror::Error;

/// Reasons raw text could not become an [`actuator_core::Action`].
///
/// The `Display` text of each variant is the exact message reported to
/// callers in the resulting error outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid JSON format.")]
    MalformedPayload,

    /// The discriminator was absent or named no known action. Non-string
    /// values are rendered as JSON text, an absent field as `null`.
    #[error("Unknown action: '{0}'")]
    UnknownAction(String),

    #[error("Missing {} for '{}' action.", quoted_fields(.kind), .kind)]
    MissingField {
        kind: ActionKind,
        field: &'static str,
    },
}

fn quoted_fields(kind: &ActionKind) -> String {
    kind.required_fields()
        .iter()
        .map(|field| format!("'{}'", field))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Failures of a well-formed action while it was being carried out.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Error creating file: {0}")]
    CreateFile(#[source] io::Error),

    #[error("Error appending to file: {0}")]
    AppendFile(#[source] io::Error),

    /// The shell could not be started, or was stopped by the timeout.
    #[error("Error running command: {0}")]
    Launch(#[source] io::Error),

    /// The command ran and exited non-zero; stderr is reported verbatim.
    #[error("{stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
}

impl From<DecodeError> for Outcome {
    fn from(err: DecodeError) -> Self {
        Outcome::error(err.to_string())
    }
}

impl From<OperationError> for Outcome {
    fn from(err: OperationError) -> Self {
        Outcome::error(err.to_string())
    }
}
