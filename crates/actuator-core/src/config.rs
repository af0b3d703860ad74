use crate::{ActuatorError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const MOCK_MODEL: &str = "mock";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which provider to use: "openai", "gemini" or "mock"
    #[serde(default = "default_provider")]
    pub provider: String,

    // OpenAI-compatible configuration
    pub openai_api_key: Option<String>,

    // Gemini configuration
    pub gemini_api_key: Option<String>,

    /// Falls back to the active provider's own default when unset
    pub default_model: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai_api_key: None,
            gemini_api_key: None,
            default_model: None,
            base_url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ProviderConfig {
    /// Model to request: the configured one, else the provider's default.
    pub fn resolved_model(&self) -> String {
        if let Some(model) = &self.default_model {
            return model.clone();
        }
        match self.provider.as_str() {
            "gemini" => DEFAULT_GEMINI_MODEL.to_string(),
            "mock" => MOCK_MODEL.to_string(),
            _ => DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Shell program used for `run_command`
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Flag that makes the shell read the command from its next argument
    #[serde(default = "default_shell_flag")]
    pub shell_flag: String,
    /// No limit when unset
    pub command_timeout_seconds: Option<u64>,
    /// Working directory for spawned commands
    pub working_dir: Option<PathBuf>,
    /// Stop a plan at its first failing step
    #[serde(default)]
    pub stop_on_error: bool,
}

fn default_shell() -> String {
    if cfg!(target_os = "windows") {
        "cmd".to_string()
    } else {
        "sh".to_string()
    }
}

fn default_shell_flag() -> String {
    if cfg!(target_os = "windows") {
        "/C".to_string()
    } else {
        "-c".to_string()
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            shell_flag: default_shell_flag(),
            command_timeout_seconds: None,
            working_dir: None,
            stop_on_error: false,
        }
    }
}

impl ExecutionConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_seconds.map(Duration::from_secs)
    }
}

impl Config {
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        let mut config = if config_file.exists() {
            info!("Loading config from: {}", config_file.display());
            let content = tokio::fs::read_to_string(&config_file).await?;
            toml::from_str(&content).map_err(|e| ActuatorError::ConfigLoadFailed {
                path: config_file.display().to_string(),
                source: e,
            })?
        } else {
            info!("No config file found, using defaults");
            Self::default()
        };

        config.load_env_overrides();
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("com", "actuator", "actuator").ok_or_else(|| {
                ActuatorError::Config {
                    message: "Could not determine config directory".to_string(),
                }
            })?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Environment is read here, once, and never by the clients themselves.
    pub fn load_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("ACTUATOR_PROVIDER") {
            self.provider.provider = provider;
        }

        // OpenAI
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.provider.openai_api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            self.provider.base_url = Some(base_url);
        }

        // Gemini
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            self.provider.gemini_api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            self.provider.base_url = Some(base_url);
        }

        if let Ok(model) = std::env::var("ACTUATOR_DEFAULT_MODEL") {
            self.provider.default_model = Some(model);
        }

        if let Ok(timeout) = std::env::var("ACTUATOR_COMMAND_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(seconds) => self.execution.command_timeout_seconds = Some(seconds),
                Err(e) => warn!("Ignoring invalid ACTUATOR_COMMAND_TIMEOUT '{}': {}", timeout, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tokio::fs;

    const ENV_KEYS: [&str; 7] = [
        "ACTUATOR_PROVIDER",
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "GEMINI_API_KEY",
        "GEMINI_BASE_URL",
        "ACTUATOR_DEFAULT_MODEL",
        "ACTUATOR_COMMAND_TIMEOUT",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.provider.provider, "openai");
        assert!(config.provider.default_model.is_none());
        assert_eq!(config.provider.resolved_model(), "gpt-4o-mini");
        assert_eq!(config.provider.timeout_seconds, 30);
        assert!(config.provider.openai_api_key.is_none());
        assert!(config.execution.command_timeout_seconds.is_none());
        assert!(config.execution.command_timeout().is_none());
        assert!(!config.execution.stop_on_error);
    }

    #[cfg(unix)]
    #[test]
    fn test_default_shell_on_unix() {
        let execution = ExecutionConfig::default();
        assert_eq!(execution.shell, "sh");
        assert_eq!(execution.shell_flag, "-c");
    }

    #[test]
    fn test_config_deserialization_partial() {
        let toml_str = r#"
            [provider]
            provider = "gemini"
            default_model = "gemini-1.5-flash-latest"

            [execution]
            command_timeout_seconds = 15
            stop_on_error = true
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.provider, "gemini");
        assert_eq!(
            config.provider.default_model.as_deref(),
            Some("gemini-1.5-flash-latest")
        );
        assert_eq!(config.provider.timeout_seconds, 30);
        assert_eq!(
            config.execution.command_timeout(),
            Some(Duration::from_secs(15))
        );
        assert!(config.execution.stop_on_error);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("timeout_seconds"));
        assert!(serialized.contains("shell_flag"));
    }

    #[test]
    fn test_resolved_model_follows_provider() {
        let mut provider = ProviderConfig {
            provider: "gemini".to_string(),
            ..Default::default()
        };
        assert_eq!(provider.resolved_model(), DEFAULT_GEMINI_MODEL);

        provider.provider = "mock".to_string();
        assert_eq!(provider.resolved_model(), MOCK_MODEL);

        provider.provider = "openai".to_string();
        assert_eq!(provider.resolved_model(), DEFAULT_OPENAI_MODEL);

        provider.provider = "gemini".to_string();
        provider.default_model = Some("gemini-2.5-pro".to_string());
        assert_eq!(provider.resolved_model(), "gemini-2.5-pro");
    }

    #[test]
    fn test_gemini_without_model_uses_gemini_default() {
        let toml_str = r#"
            [provider]
            provider = "gemini"
            gemini_api_key = "key"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.provider.default_model.is_none());
        assert_eq!(config.provider.resolved_model(), "gemini-1.5-flash-latest");
    }

    #[tokio::test]
    #[serial]
    async fn test_load_with_nonexistent_file() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let config = Config::load(Some(&missing)).await.unwrap();
        assert!(config.provider.default_model.is_none());
        assert_eq!(config.provider.resolved_model(), "gpt-4o-mini");
    }

    #[tokio::test]
    #[serial]
    async fn test_load_with_existing_file() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"
            [provider]
            default_model = "gpt-4.1"
            timeout_seconds = 120

            [execution]
            shell = "bash"
            working_dir = "/srv/project"
            "#,
        )
        .await
        .unwrap();

        let config = Config::load(Some(&config_path)).await.unwrap();
        assert_eq!(config.provider.default_model.as_deref(), Some("gpt-4.1"));
        assert_eq!(config.provider.timeout_seconds, 120);
        assert_eq!(config.execution.shell, "bash");
        assert_eq!(
            config.execution.working_dir,
            Some(PathBuf::from("/srv/project"))
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_load_with_invalid_toml() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        fs::write(&config_path, "invalid toml content {{{")
            .await
            .unwrap();

        let result = Config::load(Some(&config_path)).await;
        assert!(matches!(
            result,
            Err(ActuatorError::ConfigLoadFailed { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_load_env_overrides() {
        clear_env();
        env::set_var("ACTUATOR_PROVIDER", "gemini");
        env::set_var("GEMINI_API_KEY", "test-gemini-key");
        env::set_var("ACTUATOR_DEFAULT_MODEL", "gemini-2.5-pro");
        env::set_var("ACTUATOR_COMMAND_TIMEOUT", "45");

        let mut config = Config::default();
        config.load_env_overrides();

        assert_eq!(config.provider.provider, "gemini");
        assert_eq!(
            config.provider.gemini_api_key,
            Some("test-gemini-key".to_string())
        );
        assert_eq!(
            config.provider.default_model.as_deref(),
            Some("gemini-2.5-pro")
        );
        assert_eq!(config.execution.command_timeout_seconds, Some(45));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_override_is_ignored() {
        clear_env();
        env::set_var("ACTUATOR_COMMAND_TIMEOUT", "soon");

        let mut config = Config::default();
        config.load_env_overrides();
        assert!(config.execution.command_timeout_seconds.is_none());

        clear_env();
    }

    #[test]
    fn test_default_config_path() {
        if let Ok(path) = Config::default_config_path() {
            assert!(path.to_string_lossy().contains("actuator"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
