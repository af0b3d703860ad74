use actuator_core::config::Config;
use actuator_core::provider::{ProviderClient, ProviderMessage, ProviderRequest};
use actuator_core::{ActuatorError, Outcome, Result};
use actuator_engine::{decode_plan, ActionExecutor, PlanReport, PlanRunner, StepReport};
use actuator_provider::ProviderClientFactory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::prompt::{ACTION_INSTRUCTIONS, PLAN_INSTRUCTIONS};

/// Result of one request through the single-action pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResponse {
    pub request_id: Uuid,
    /// Model text exactly as received
    pub raw_response: String,
    pub outcome: Outcome,
    pub completed_at: DateTime<Utc>,
}

/// Result of one request through the plan pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub request_id: Uuid,
    pub raw_response: String,
    pub report: PlanReport,
    pub completed_at: DateTime<Utc>,
}

/// Natural-language request in, executed action out.
///
/// Provider failures are returned as `Err`; anything that goes wrong after
/// the model has answered is reported inside the outcome.
pub struct ActionPipeline {
    provider: Arc<dyn ProviderClient>,
    executor: ActionExecutor,
    model: String,
    stop_on_error: bool,
}

impl ActionPipeline {
    pub fn new(
        provider: Arc<dyn ProviderClient>,
        executor: ActionExecutor,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            executor,
            model: model.into(),
            stop_on_error: false,
        }
    }

    /// Build the provider client and executor described by `config`.
    #[instrument(skip(config))]
    pub fn from_config(config: &Config) -> Result<Self> {
        ProviderClientFactory::validate_config(&config.provider).map_err(|e| {
            ActuatorError::Provider {
                message: format!("Provider configuration validation failed: {}", e),
            }
        })?;

        let provider = ProviderClientFactory::create_client(&config.provider).map_err(|e| {
            ActuatorError::Provider {
                message: format!("Failed to create provider client: {}", e),
            }
        })?;

        Ok(Self::new(
            provider,
            ActionExecutor::from_config(&config.execution),
            config.provider.resolved_model(),
        )
        .stop_on_error(config.execution.stop_on_error))
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(request_len = request.len()))]
    pub async fn handle(&self, request: &str) -> Result<PipelineResponse> {
        let (request_id, raw_response) = self.ask(ACTION_INSTRUCTIONS, request).await?;

        let outcome = self.executor.execute_raw(&raw_response).await;
        info!(%request_id, status = ?outcome.status, "request handled");

        Ok(PipelineResponse {
            request_id,
            raw_response,
            outcome,
            completed_at: Utc::now(),
        })
    }

    #[instrument(skip(self, request), fields(request_len = request.len()))]
    pub async fn handle_plan(&self, request: &str) -> Result<PlanResponse> {
        let (request_id, raw_response) = self.ask(PLAN_INSTRUCTIONS, request).await?;

        let report = match decode_plan(&raw_response) {
            Ok(plan) => {
                info!(%request_id, steps = plan.steps.len(), "running plan");
                PlanRunner::new(self.executor.clone())
                    .stop_on_error(self.stop_on_error)
                    .run(plan)
                    .await
            }
            Err(e) => {
                warn!(%request_id, error = %e, "model response is not a plan");
                PlanReport {
                    steps: vec![StepReport {
                        index: 0,
                        title: None,
                        outcome: Some(e.into()),
                    }],
                }
            }
        };

        Ok(PlanResponse {
            request_id,
            raw_response,
            report,
            completed_at: Utc::now(),
        })
    }

    async fn ask(&self, instructions: &str, request: &str) -> Result<(Uuid, String)> {
        let provider_request = ProviderRequest {
            id: Uuid::new_v4(),
            messages: vec![
                ProviderMessage::system(instructions),
                ProviderMessage::user(request),
            ],
            model: self.model.clone(),
        };
        let request_id = provider_request.id;

        let response = self.provider.complete(provider_request).await?;
        if let Some(usage) = &response.usage {
            info!(
                %request_id,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "model responded"
            );
        }

        Ok((request_id, response.content))
    }
}
