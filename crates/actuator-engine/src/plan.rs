//! Multi-step plans: an ordered list of titled actions produced by the
//! model in one response, executed one after another.

use actuator_core::{Action, Outcome};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::decode::{decode_object, strip_code_fence};
use crate::error::DecodeError;
use crate::executor::ActionExecutor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    pub steps: Vec<PlanStep>,
}

/// One plan entry. A step that failed to decode is kept so that it can be
/// reported in order alongside the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub title: Option<String>,
    pub action: Result<Action, DecodeError>,
}

/// Decode a plan payload.
///
/// Accepts `{"steps": [ ... ]}` or a bare array of steps, optionally fenced.
/// Each step is an action object with an optional `title`.
pub fn decode_plan(raw: &str) -> Result<ActionPlan, DecodeError> {
    let payload = strip_code_fence(raw);
    let value: Value = serde_json::from_str(payload).map_err(|e| {
        debug!(error = %e, "plan payload is not valid JSON");
        DecodeError::MalformedPayload
    })?;

    let steps = match value {
        Value::Array(steps) => steps,
        Value::Object(mut object) => match object.remove("steps") {
            Some(Value::Array(steps)) => steps,
            _ => return Err(DecodeError::MalformedPayload),
        },
        _ => return Err(DecodeError::MalformedPayload),
    };

    let steps = steps
        .into_iter()
        .map(|step| match step {
            Value::Object(object) => PlanStep {
                title: object
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                action: decode_object(&object),
            },
            _ => PlanStep {
                title: None,
                action: Err(DecodeError::MalformedPayload),
            },
        })
        .collect();

    Ok(ActionPlan { steps })
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `None` when the step was skipped
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanReport {
    pub steps: Vec<StepReport>,
}

impl PlanReport {
    pub fn succeeded(&self) -> usize {
        self.count(|outcome| outcome.is_some_and(Outcome::is_success))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| outcome.is_some_and(|o| !o.is_success()))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| outcome.is_none())
    }

    /// True when every step ran and succeeded.
    pub fn is_success(&self) -> bool {
        self.succeeded() == self.steps.len()
    }

    fn count(&self, predicate: impl Fn(Option<&Outcome>) -> bool) -> usize {
        self.steps
            .iter()
            .filter(|step| predicate(step.outcome.as_ref()))
            .count()
    }
}

/// Executes plan steps strictly in order.
#[derive(Clone)]
pub struct PlanRunner {
    executor: ActionExecutor,
    stop_on_error: bool,
}

impl PlanRunner {
    pub fn new(executor: ActionExecutor) -> Self {
        Self {
            executor,
            stop_on_error: false,
        }
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub async fn run(&self, plan: ActionPlan) -> PlanReport {
        let total = plan.steps.len();
        let mut report = PlanReport::default();
        let mut halted = false;

        for (index, step) in plan.steps.into_iter().enumerate() {
            if halted {
                report.steps.push(StepReport {
                    index,
                    title: step.title,
                    outcome: None,
                });
                continue;
            }

            info!(
                step = index + 1,
                total,
                title = step.title.as_deref().unwrap_or(""),
                "running plan step"
            );
            let outcome = match step.action {
                Ok(action) => self.executor.execute(action).await,
                Err(e) => Outcome::from(e),
            };

            if !outcome.is_success() && self.stop_on_error {
                warn!(step = index + 1, "plan halted at failing step");
                halted = true;
            }

            report.steps.push(StepReport {
                index,
                title: step.title,
                outcome: Some(outcome),
            });
        }

        report
    }
}
