use chatrs_core::models::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, MAX_TOKENS_RANGE,
    TEMPERATURE_RANGE,
};
use chatrs_core::{ClearPolicy, GenerationOptions, SUPPORTED_MODELS, is_supported_model};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable consulted when no key is passed on the command line.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Temperature {0} is outside 0.0..=1.0")]
    InvalidTemperature(f32),

    #[error("Max tokens {0} is outside 50..=300")]
    InvalidMaxTokens(u32),

    #[error("Unsupported model '{0}'")]
    UnsupportedModel(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chat: ChatDefaults,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChatDefaults {
    #[serde(default = "ChatDefaults::default_model")]
    pub model: String,
    #[serde(default = "ChatDefaults::default_temperature")]
    pub temperature: f32,
    #[serde(default = "ChatDefaults::default_max_tokens")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub clear_policy: ClearPolicy,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            temperature: Self::default_temperature(),
            max_tokens: Self::default_max_tokens(),
            system_prompt: None,
            clear_policy: ClearPolicy::default(),
        }
    }
}

impl ChatDefaults {
    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    const fn default_temperature() -> f32 {
        DEFAULT_TEMPERATURE
    }

    #[allow(clippy::unnecessary_wraps)]
    const fn default_max_tokens() -> Option<u32> {
        Some(DEFAULT_MAX_TOKENS)
    }

    /// Check the sidebar-style bounds: temperature, token limit and model allow-list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        if let Some(max_tokens) = self.max_tokens.filter(|n| !MAX_TOKENS_RANGE.contains(n)) {
            return Err(ConfigError::InvalidMaxTokens(max_tokens));
        }
        if !is_supported_model(&self.model) {
            return Err(ConfigError::UnsupportedModel(self.model.clone()));
        }
        Ok(())
    }

    #[must_use]
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.trim().to_string(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub groq: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    const fn default_timeout_secs() -> u64 {
        DEFAULT_TIMEOUT_SECS
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("chatrs"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/chatrs/config.json`, falling back to defaults when it does not exist.
    ///
    /// The chat can run without a file as long as a key arrives from the
    /// command line or the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Pick the API key: command line first, then `GROQ_API_KEY`, then the file.
    #[must_use]
    pub fn resolve_api_key(&self, cli_key: Option<String>) -> String {
        self.resolve_api_key_with(cli_key, std::env::var(API_KEY_ENV).ok())
    }

    #[must_use]
    pub fn resolve_api_key_with(&self, cli_key: Option<String>, env_key: Option<String>) -> String {
        [cli_key, env_key]
            .into_iter()
            .flatten()
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .unwrap_or_else(|| self.providers.groq.api_key.trim().to_string())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, Self::template())?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Groq API key");
        println!("      (or export {API_KEY_ENV})");
        println!("   2. Run 'chatrs chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - model: one of {}", SUPPORTED_MODELS.join(", "));
        println!("   - temperature: 0.0 to 1.0");
        println!("   - max_tokens: 50 to 300");
        println!("   - clear_policy: clear_both or display_only");
        println!();
        Ok(())
    }

    fn template() -> &'static str {
        r#"{
  "chat": {
    "model": "llama-3.3-70b-versatile",
    "temperature": 0.7,
    "max_tokens": 150,
    "clear_policy": "clear_both"
  },
  "providers": {
    "groq": {
      "api_key": "your-groq-api-key-here",
      "timeout_secs": 60
    }
  }
}"#
    }
}
