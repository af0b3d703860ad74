use crate::error::{ProviderError, Result};
use crate::http::{handle_response, timeout_error};
use crate::models::{
    GeminiContent, GeminiPart, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::retry::RetryPolicy;
use actuator_core::config::ProviderConfig;
use actuator_core::provider::{ProviderClient, ProviderRequest, ProviderResponse};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            max_output_tokens: Some(4096),
            temperature: Some(0.2),
        }
    }
}

impl From<&ProviderConfig> for GeminiConfig {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            api_key: config.gemini_api_key.clone().unwrap_or_default(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout: Duration::from_secs(config.timeout_seconds),
            ..Default::default()
        }
    }
}

/// Client for Google's `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ProviderError::Configuration {
                message: "Gemini API key is required".to_string(),
            });
        }

        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(&config.api_key).map_err(|e| {
            ProviderError::Configuration {
                message: format!("Invalid API key format: {}", e),
            }
        })?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    pub fn from_provider_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(config.into())
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// System messages become the system instruction; assistant turns are
    /// sent with Gemini's `model` role.
    fn build_request(&self, request: &ProviderRequest) -> GenerateContentRequest {
        let mut system = Vec::new();
        let mut contents = Vec::new();

        for message in &request.messages {
            let part = GeminiPart {
                text: message.content.clone(),
            };
            match message.role.as_str() {
                "system" => system.push(part),
                "assistant" => contents.push(GeminiContent {
                    role: Some("model".to_string()),
                    parts: vec![part],
                }),
                _ => contents.push(GeminiContent {
                    role: Some("user".to_string()),
                    parts: vec![part],
                }),
            }
        }

        GenerateContentRequest {
            system_instruction: (!system.is_empty()).then(|| GeminiContent {
                role: None,
                parts: system,
            }),
            contents,
            generation_config: Some(GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            }),
        }
    }

    #[instrument(skip(self, body))]
    pub async fn generate_content(
        &self,
        model: &str,
        body: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model);
        debug!("Making generateContent request to: {}", url);

        self.config
            .retry
            .run(|| async {
                let response = timeout(
                    self.config.timeout,
                    self.client.post(&url).json(&body).send(),
                )
                .await
                .map_err(|_| timeout_error("generate_content", self.config.timeout))??;

                handle_response(response, model).await
            })
            .await
    }
}

/// Text of the first candidate's parts, concatenated.
fn first_candidate_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().map(|part| part.text.as_str()).collect();
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl ProviderClient for GeminiClient {
    #[instrument(skip(self, request), fields(request_id = %request.id, model = %request.model))]
    async fn complete(&self, request: ProviderRequest) -> actuator_core::Result<ProviderResponse> {
        info!("Processing completion request for model: {}", request.model);

        let body = self.build_request(&request);
        let response = self.generate_content(&request.model, body).await?;

        let content =
            first_candidate_text(&response).ok_or_else(|| ProviderError::EmptyResponse {
                provider: "gemini".to_string(),
            })?;

        Ok(ProviderResponse {
            id: request.id,
            content,
            usage: response.usage_metadata.map(Into::into),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actuator_core::provider::ProviderMessage;
    use uuid::Uuid;

    fn client() -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: "test-gemini-key".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_gemini_config_from_provider_config() {
        let provider_config = ProviderConfig {
            provider: "gemini".to_string(),
            gemini_api_key: Some("g-key".to_string()),
            timeout_seconds: 45,
            ..ProviderConfig::default()
        };
        let config = GeminiConfig::from(&provider_config);
        assert_eq!(config.api_key, "g-key");
        assert_eq!(config.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_client_creation_fails_without_api_key() {
        assert!(matches!(
            GeminiClient::new(GeminiConfig::default()),
            Err(ProviderError::Configuration { .. })
        ));
    }

    #[test]
    fn test_endpoint_format() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: "k".to_string(),
            base_url: "http://localhost:8080/v1beta/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint("gemini-1.5-flash-latest"),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn test_build_request_splits_system_instruction() {
        let request = ProviderRequest {
            id: Uuid::new_v4(),
            messages: vec![
                ProviderMessage::system("Respond ONLY with JSON."),
                ProviderMessage::user("make a file"),
                ProviderMessage {
                    role: "assistant".to_string(),
                    content: "{}".to_string(),
                },
            ],
            model: "gemini-1.5-flash-latest".to_string(),
        };

        let body = client().build_request(&request);
        let system = body.system_instruction.unwrap();
        assert_eq!(system.parts[0].text, "Respond ONLY with JSON.");
        assert_eq!(body.contents.len(), 2);
        assert_eq!(body.contents[0].role.as_deref(), Some("user"));
        assert_eq!(body.contents[1].role.as_deref(), Some("model"));
    }

    #[test]
    fn test_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"action\":"}, {"text": " \"run_command\"}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            first_candidate_text(&response).as_deref(),
            Some("{\"action\": \"run_command\"}")
        );

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(first_candidate_text(&empty).is_none());
    }
}
