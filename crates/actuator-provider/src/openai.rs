use crate::error::{ProviderError, Result};
use crate::http::{handle_response, timeout_error};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse};
use crate::retry::RetryPolicy;
use actuator_core::config::ProviderConfig;
use actuator_core::provider::{ProviderClient, ProviderRequest, ProviderResponse};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible API client configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub max_concurrent_requests: usize,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            max_concurrent_requests: 10,
            max_tokens: Some(4096),
            temperature: Some(0.2),
        }
    }
}

impl From<&ProviderConfig> for OpenAIConfig {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            api_key: config.openai_api_key.clone().unwrap_or_default(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            timeout: Duration::from_secs(config.timeout_seconds),
            ..Default::default()
        }
    }
}

/// Client for `/chat/completions` on OpenAI or any compatible server.
pub struct OpenAIClient {
    client: Client,
    config: OpenAIConfig,
    semaphore: Arc<Semaphore>,
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ProviderError::Configuration {
                message: "OpenAI API key is required".to_string(),
            });
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|e| {
                ProviderError::Configuration {
                    message: format!("Invalid API key format: {}", e),
                }
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("actuator/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_requests.max(1)));

        Ok(Self {
            client,
            config,
            semaphore,
        })
    }

    pub fn from_provider_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(config.into())
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| ProviderError::Unknown {
                message: format!("Failed to acquire semaphore: {}", e),
            })?;

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        debug!("Making chat completion request to: {}", url);

        self.config
            .retry
            .run(|| async {
                let response = timeout(
                    self.config.timeout,
                    self.client.post(&url).json(&request).send(),
                )
                .await
                .map_err(|_| timeout_error("chat_completion", self.config.timeout))??;

                handle_response(response, &request.model).await
            })
            .await
    }

    fn build_request(&self, request: ProviderRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model,
            messages: request.messages.into_iter().map(Into::into).collect(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: Some(false),
        }
    }
}

#[async_trait]
impl ProviderClient for OpenAIClient {
    #[instrument(skip(self, request), fields(request_id = %request.id, model = %request.model))]
    async fn complete(&self, request: ProviderRequest) -> actuator_core::Result<ProviderResponse> {
        info!("Processing completion request for model: {}", request.model);

        let id = request.id;
        let response = self.chat_completion(self.build_request(request)).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: "openai".to_string(),
            })?;

        Ok(ProviderResponse {
            id,
            content,
            usage: response.usage.map(Into::into),
        })
    }
}
