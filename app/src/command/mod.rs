//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use chatrs_config::Config;
use chatrs_conversation::{ChatSettings, ClearPolicy};
use chatrs_core::util::DEFAULT_SYSTEM_PROMPT;
use chatrs_providers::GroqProvider;
use std::time::Duration;
use tracing::{info, warn};

mod chat;
mod info;
mod init;
mod models;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use models::ModelsStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Per-run overrides for the values in the config file.
#[derive(Debug, Clone, Default)]
pub struct ChatOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub clear_policy: Option<ClearPolicy>,
}

/// Merge config file and overrides into validated session settings.
///
/// A missing API key is not an error here: the first request reports it.
fn build_settings(config: &Config, overrides: ChatOverrides) -> anyhow::Result<ChatSettings> {
    let mut defaults = config.chat.clone();
    if let Some(model) = overrides.model {
        defaults.model = model;
    }
    if let Some(temperature) = overrides.temperature {
        defaults.temperature = temperature;
    }
    if let Some(max_tokens) = overrides.max_tokens {
        defaults.max_tokens = Some(max_tokens);
    }
    if let Some(policy) = overrides.clear_policy {
        defaults.clear_policy = policy;
    }
    defaults.validate()?;

    let api_key = config.resolve_api_key(overrides.api_key);
    if api_key.is_empty() {
        warn!("No API key configured; requests will be refused until one is set");
    }

    let system_prompt = defaults
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    info!(
        "Chat settings: model={}, temperature={}, max_tokens={:?}, clear_policy={}",
        defaults.model, defaults.temperature, defaults.max_tokens, defaults.clear_policy
    );

    Ok(ChatSettings::new(api_key, defaults.generation_options())
        .with_system_prompt(system_prompt)
        .with_clear_policy(defaults.clear_policy))
}

fn build_provider(config: &Config, api_key: String) -> anyhow::Result<GroqProvider> {
    let groq = &config.providers.groq;
    let provider = GroqProvider::new(api_key, Duration::from_secs(groq.timeout_secs))?;
    Ok(match groq.base_url.clone() {
        Some(url) => provider.with_base_url(url),
        None => provider,
    })
}
