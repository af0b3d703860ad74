use actuator_core::provider::{
    ProviderClient, ProviderMessage, ProviderRequest, ProviderResponse, Usage,
};
use actuator_core::Result;
use async_trait::async_trait;
use serde_json::json;

const OFFLINE_COMMAND: &str = "echo 'actuator is running without a configured provider'";

/// Offline provider for development without credentials.
///
/// Replies with a harmless `run_command` action, or a one-step plan when the
/// instructions ask for `steps`, so the full pipeline can be exercised.
#[derive(Debug, Default, Clone)]
pub struct MockProviderClient {
    reply: Option<String>,
}

impl MockProviderClient {
    /// Always answer with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse> {
        let content = match &self.reply {
            Some(reply) => reply.clone(),
            None => generate_reply(&request.messages),
        };
        let prompt_tokens = request.messages.len() as u32 * 10;

        Ok(ProviderResponse {
            id: request.id,
            content,
            usage: Some(Usage {
                prompt_tokens,
                completion_tokens: 12,
                total_tokens: prompt_tokens + 12,
            }),
        })
    }
}

fn generate_reply(messages: &[ProviderMessage]) -> String {
    let action = json!({"action": "run_command", "command": OFFLINE_COMMAND});

    let wants_plan = messages
        .iter()
        .any(|m| m.role == "system" && m.content.contains("\"steps\""));

    if wants_plan {
        let mut step = action;
        step["title"] = json!("Report offline mode");
        json!({ "steps": [step] }).to_string()
    } else {
        action.to_string()
    }
}
