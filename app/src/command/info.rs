use chatrs_config::Config;
use chatrs_core::SUPPORTED_MODELS;
use chatrs_core::util::{DEFAULT_SYSTEM_PROMPT, mask_secret};

/// Strategy for displaying the effective configuration.
///
/// The API key is masked; the key shown is the one a chat would use, after
/// the environment override.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== chatrs Configuration ===\n");
        println!("Config file: {}", Config::config_path()?.display());
        println!();

        println!("API Key:");
        println!("  Groq: {}", mask_secret(&config.resolve_api_key(None)));
        if let Some(ref url) = config.providers.groq.base_url {
            println!("  Base URL: {url}");
        }
        println!("  Timeout: {}s", config.providers.groq.timeout_secs);
        println!();

        let chat = &config.chat;
        println!("Chat Defaults:");
        println!("  Model: {}", chat.model);
        println!("  Temperature: {}", chat.temperature);
        match chat.max_tokens {
            Some(n) => println!("  Max Tokens: {n}"),
            None => println!("  Max Tokens: (model default)"),
        }
        println!("  Clear Policy: {}", chat.clear_policy);
        let prompt = chat.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        println!("  System Prompt: {}", truncate(prompt, 60));
        if let Err(e) = chat.validate() {
            println!("  Warning: {e}");
        }
        println!();

        println!("Supported Models:");
        for model in SUPPORTED_MODELS {
            println!("  {model}");
        }

        Ok(())
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_text() {
        assert_eq!(truncate("short", 60), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }
}
