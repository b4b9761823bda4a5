//! Interactive chat with an in-memory session.

use chatrs_config::Config;
use chatrs_conversation::ConversationManager;
use tracing::info;

use super::{ChatOverrides, build_provider, build_settings};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    pub overrides: ChatOverrides,
}

/// Strategy for executing the Chat command.
///
/// The session lives only as long as this command runs.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let settings = build_settings(&config, input.overrides)?;
        let provider = build_provider(&config, settings.api_key.clone())?;

        let mut manager = ConversationManager::new(provider, settings);

        if let Some(msg) = input.message {
            let result = manager.submit(&msg).await?;
            println!("{}", result.response);
        } else {
            manager.run_interactive().await?;

            let session = manager.session();
            let stats = session.history().stats();
            info!(
                "Conversation ended: {} turns, ~{} tokens, started {}, last activity {}",
                stats.total_turns,
                stats.estimated_tokens,
                session.created_at().format("%H:%M:%S"),
                session.updated_at().format("%H:%M:%S")
            );
        }

        Ok(())
    }
}
