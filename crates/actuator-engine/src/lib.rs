//! # Actuator Engine
//!
//! Decodes model-produced action payloads and executes them against the
//! local machine. Every failure, whether in decoding or in the effect
//! itself, comes back as an error [`Outcome`] rather than a Rust error.
//!
//! ```rust,no_run
//! # async fn demo() {
//! let outcome = actuator_engine::execute_action(
//!     r#"{"action": "run_command", "command": "echo hello"}"#,
//! )
//! .await;
//! assert!(outcome.is_success());
//! # }
//! ```

pub mod decode;
pub mod error;
pub mod executor;
pub mod plan;
pub mod runner;

pub use actuator_core::{Action, ActionKind, Outcome, OutcomeStatus};
pub use decode::{decode, strip_code_fence};
pub use error::{DecodeError, OperationError};
pub use executor::ActionExecutor;
pub use plan::{decode_plan, ActionPlan, PlanReport, PlanRunner, PlanStep, StepReport};
pub use runner::{ProcessOutput, ProcessRunner, ShellRunner};

/// Decode `raw` and execute it with a default executor (`sh -c`, no timeout).
pub async fn execute_action(raw: &str) -> Outcome {
    ActionExecutor::default().execute_raw(raw).await
}
