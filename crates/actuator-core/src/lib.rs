pub mod action;
pub mod config;
pub mod error;
pub mod provider;

pub use action::{Action, ActionKind, Outcome, OutcomeStatus};
pub use error::{ActuatorError, Result};
