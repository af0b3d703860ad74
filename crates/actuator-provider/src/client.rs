use crate::error::{ProviderError, Result};
use crate::gemini::GeminiClient;
use crate::mock::MockProviderClient;
use crate::openai::OpenAIClient;
use actuator_core::config::ProviderConfig;
use actuator_core::provider::ProviderClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Provider names accepted in configuration.
pub const SUPPORTED_PROVIDERS: [&str; 3] = ["openai", "gemini", "mock"];

/// Factory for creating provider clients
pub struct ProviderClientFactory;

impl ProviderClientFactory {
    /// Create the client named by `config.provider`.
    ///
    /// A real provider without credentials falls back to the offline mock.
    pub fn create_client(config: &ProviderConfig) -> Result<Arc<dyn ProviderClient>> {
        match config.provider.to_ascii_lowercase().as_str() {
            "openai" => match config.openai_api_key {
                Some(ref key) if !key.is_empty() => {
                    info!("Creating OpenAI provider client");
                    Ok(Arc::new(OpenAIClient::from_provider_config(config)?))
                }
                _ => {
                    warn!("No OpenAI API key found; using mock provider client");
                    Ok(Arc::new(MockProviderClient::default()))
                }
            },
            "gemini" => match config.gemini_api_key {
                Some(ref key) if !key.is_empty() => {
                    info!("Creating Gemini provider client");
                    Ok(Arc::new(GeminiClient::from_provider_config(config)?))
                }
                _ => {
                    warn!("No Gemini API key found; using mock provider client");
                    Ok(Arc::new(MockProviderClient::default()))
                }
            },
            "mock" => {
                info!("Creating mock provider client");
                Ok(Arc::new(MockProviderClient::default()))
            }
            other => Err(ProviderError::Configuration {
                message: format!(
                    "Unknown provider '{}', expected one of: {}",
                    other,
                    SUPPORTED_PROVIDERS.join(", ")
                ),
            }),
        }
    }

    /// Validate provider configuration
    pub fn validate_config(config: &ProviderConfig) -> Result<()> {
        let provider = config.provider.to_ascii_lowercase();
        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            return Err(ProviderError::Configuration {
                message: format!("Unknown provider '{}'", config.provider),
            });
        }

        let has_key = match provider.as_str() {
            "openai" => config.openai_api_key.is_some(),
            "gemini" => config.gemini_api_key.is_some(),
            _ => true,
        };
        if !has_key {
            info!("No API key supplied; validation will fall back to mock provider");
        }

        if config.default_model.as_deref().is_some_and(str::is_empty) {
            return Err(ProviderError::Configuration {
                message: "Default model must not be empty".to_string(),
            });
        }

        if config.timeout_seconds == 0 {
            warn!("Timeout is set to 0, this may cause issues");
        }

        if let Some(base_url) = &config.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ProviderError::Configuration {
                    message: "Base URL must start with http:// or https://".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actuator_core::provider::{ProviderMessage, ProviderRequest};

    fn config(provider: &str) -> ProviderConfig {
        ProviderConfig {
            provider: provider.to_string(),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_validate_config_missing_api_key() {
        assert!(ProviderClientFactory::validate_config(&config("openai")).is_ok());
    }

    #[test]
    fn test_validate_config_empty_model() {
        let config = ProviderConfig {
            openai_api_key: Some("test-key".to_string()),
            default_model: Some(String::new()),
            ..ProviderConfig::default()
        };
        assert!(ProviderClientFactory::validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_unset_model() {
        let config = ProviderConfig {
            provider: "gemini".to_string(),
            gemini_api_key: Some("gm-test".to_string()),
            default_model: None,
            ..ProviderConfig::default()
        };
        assert!(ProviderClientFactory::validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_invalid_base_url() {
        let config = ProviderConfig {
            openai_api_key: Some("test-key".to_string()),
            base_url: Some("invalid-url".to_string()),
            ..ProviderConfig::default()
        };
        assert!(ProviderClientFactory::validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_unknown_provider() {
        assert!(matches!(
            ProviderClientFactory::validate_config(&config("anthropomorphic")),
            Err(ProviderError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_config_valid() {
        let config = ProviderConfig {
            openai_api_key: Some("test-key".to_string()),
            default_model: Some("gpt-4".to_string()),
            base_url: Some("https://api.openai.com/v1".to_string()),
            ..ProviderConfig::default()
        };
        assert!(ProviderClientFactory::validate_config(&config).is_ok());
    }

    #[test]
    fn test_create_client_unknown_provider_fails() {
        assert!(ProviderClientFactory::create_client(&config("nope")).is_err());
    }

    #[test]
    fn test_create_client_with_keys() {
        let openai = ProviderConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..config("openai")
        };
        assert!(ProviderClientFactory::create_client(&openai).is_ok());

        let gemini = ProviderConfig {
            gemini_api_key: Some("g-test".to_string()),
            ..config("GEMINI")
        };
        assert!(ProviderClientFactory::create_client(&gemini).is_ok());
    }

    #[tokio::test]
    async fn test_create_client_without_api_key_uses_mock() {
        for name in ["openai", "gemini", "mock"] {
            let client = ProviderClientFactory::create_client(&config(name)).expect("mock provider");
            let request = ProviderRequest {
                id: uuid::Uuid::new_v4(),
                messages: vec![ProviderMessage::user("Hello")],
                model: "mock".to_string(),
            };

            let response = client.complete(request).await.expect("mock response");
            assert!(response.content.contains("run_command"));
        }
    }
}
