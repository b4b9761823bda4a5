//! Conversation manager driving one chat session.
//!
//! The `ConversationManager` is the main entry point: it validates input,
//! calls the gateway one request at a time and applies the outcome to the
//! session.

use chatrs_core::{GatewayError, LLMProvider, Usage, generate};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ConversationError;
use crate::command::SlashCommand;
use crate::export::write_export;
use crate::session::{ChatSession, ChatSettings};

/// Result of a successful turn or retry.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Assistant's response
    pub response: String,
    /// Token usage reported by the gateway
    pub usage: Option<Usage>,
    /// Number of user turns in the session so far
    pub turn_number: usize,
}

/// Multi-turn chat over a single in-memory session.
pub struct ConversationManager<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    session: ChatSession,
}

impl<P> ConversationManager<P>
where
    P: LLMProvider + Send + Sync,
{
    #[must_use]
    pub fn new(provider: P, settings: ChatSettings) -> Self {
        let session = ChatSession::new(settings);
        info!("Starting conversation session: {}", session.id());
        Self { provider, session }
    }

    /// Submit user input and wait for the reply.
    ///
    /// Blank input and a missing API key are rejected before anything is
    /// appended. A gateway failure leaves the user's turn in place and no
    /// assistant turn.
    pub async fn submit(&mut self, input: &str) -> Result<TurnResult, ConversationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ConversationError::EmptyInput);
        }
        self.preflight()?;

        self.session.begin_request()?;
        self.session.append_user_turn(input)?;
        let turn_number = self.session.turn_count();
        info!(
            "Processing turn {turn_number} for session: {}",
            self.session.id()
        );

        let settings = self.session.settings();
        let result = generate(
            &self.provider,
            &settings.system_prompt,
            input,
            self.session.memory(),
            &settings.options,
        )
        .await;
        self.session.finish_request();

        match result {
            Ok(exchange) => {
                let usage = exchange.usage;
                let response = self.session.complete_exchange(exchange).text.clone();
                debug!("Turn {turn_number} completed successfully");
                Ok(TurnResult {
                    response,
                    usage,
                    turn_number,
                })
            }
            Err(e) => {
                warn!("Turn {turn_number} failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Regenerate the last reply.
    ///
    /// Returns `Ok(None)` when the transcript does not end with a
    /// `(user, assistant)` pair. The old reply stays until a new one arrives,
    /// so a failed retry changes nothing.
    pub async fn retry_last(&mut self) -> Result<Option<TurnResult>, ConversationError> {
        let Some(prompt) = self.session.retry_prompt().map(str::to_string) else {
            debug!("Nothing to retry");
            return Ok(None);
        };
        self.preflight()?;

        self.session.begin_request()?;
        info!("Retrying last response for session: {}", self.session.id());

        let memory = self.session.memory().rewound();
        let settings = self.session.settings();
        let result = generate(
            &self.provider,
            &settings.system_prompt,
            &prompt,
            &memory,
            &settings.options,
        )
        .await;
        self.session.finish_request();

        let exchange = result.inspect_err(|e| warn!("Retry failed: {e}"))?;
        let usage = exchange.usage;
        let response = self
            .session
            .complete_retry(exchange)
            .map(|turn| turn.text.clone())
            .unwrap_or_default();

        Ok(Some(TurnResult {
            response,
            usage,
            turn_number: self.session.turn_count(),
        }))
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    pub fn reset(&mut self) {
        self.session.reset();
        info!("Session reset, new session: {}", self.session.id());
    }

    /// Save the transcript as `chat_history.txt` under `dir`.
    pub fn download(&self, dir: &Path) -> Result<PathBuf, ConversationError> {
        Ok(write_export(self.session.history(), dir)?)
    }

    #[must_use]
    pub const fn session(&self) -> &ChatSession {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    /// Checks that need no network: a key is present and the model is allowed.
    fn preflight(&self) -> Result<(), ConversationError> {
        let settings = self.session.settings();
        if !settings.has_api_key() {
            return Err(GatewayError::missing_api_key().into());
        }
        settings.options.ensure_supported_model()?;
        Ok(())
    }

    /// Run the chat on stdin/stdout until the user exits.
    pub async fn run_interactive(&mut self) -> Result<(), ConversationError> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.run_with_io(stdin.lock(), stdout.lock()).await
    }

    /// Interactive loop over arbitrary line input and output.
    pub async fn run_with_io<R, W>(&mut self, mut input: R, mut out: W) -> Result<(), ConversationError>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(
            out,
            "=== Chat ({}, temperature {}) ===",
            self.session.settings().options.model,
            self.session.settings().options.temperature
        )?;
        writeln!(out, "Type /help for commands, 'exit' to quit.\n")?;

        let mut show_memory = false;

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let mut raw = Vec::new();
            if input.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let Ok(line) = String::from_utf8(raw) else {
                warn!("Ignoring input line that is not valid UTF-8");
                writeln!(out, "Error: input is not valid UTF-8; line ignored.")?;
                continue;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match SlashCommand::parse_from_text(line) {
                Some(Ok(SlashCommand::Exit)) => break,
                Some(Ok(command)) => {
                    if let SlashCommand::Memory = command {
                        show_memory = !show_memory;
                        let state = if show_memory { "on" } else { "off" };
                        writeln!(out, "Memory display {state}.")?;
                        if show_memory {
                            write!(out, "{}", self.session.memory())?;
                        }
                    } else {
                        self.handle_command(command, &mut out).await?;
                    }
                }
                Some(Err(unknown)) => {
                    writeln!(out, "Unknown command '/{unknown}'. Type /help for commands.")?;
                }
                None => {
                    writeln!(out, "thinking...")?;
                    match self.submit(line).await {
                        Ok(result) => {
                            writeln!(out, "\n{}\n", result.response)?;
                            log_usage(result.usage);
                        }
                        Err(e) => report_error(&mut out, &e)?,
                    }
                    if show_memory {
                        write!(out, "{}", self.session.memory())?;
                    }
                }
            }
        }

        writeln!(
            out,
            "\nSession ended. Total turns: {}",
            self.session.turn_count()
        )?;
        Ok(())
    }

    async fn handle_command<W: Write>(
        &mut self,
        command: SlashCommand,
        out: &mut W,
    ) -> Result<(), ConversationError> {
        match command {
            SlashCommand::Clear => {
                self.clear();
                writeln!(out, "Chat cleared.")?;
            }
            SlashCommand::Reset => {
                self.reset();
                writeln!(out, "Session reset.")?;
            }
            SlashCommand::Retry => {
                writeln!(out, "thinking...")?;
                match self.retry_last().await {
                    Ok(Some(result)) => {
                        writeln!(out, "\n{}\n", result.response)?;
                        log_usage(result.usage);
                    }
                    Ok(None) => writeln!(out, "Nothing to retry.")?,
                    Err(e) => report_error(out, &e)?,
                }
            }
            SlashCommand::Download(dir) => {
                let dir = dir.unwrap_or_else(|| PathBuf::from("."));
                match self.download(&dir) {
                    Ok(path) => writeln!(out, "Saved chat to {}", path.display())?,
                    Err(e) => writeln!(out, "Error: {e}")?,
                }
            }
            SlashCommand::History => {
                if self.session.history().is_empty() {
                    writeln!(out, "(no messages yet)")?;
                }
                for line in self.session.history().export_lines() {
                    write!(out, "{line}")?;
                }
            }
            SlashCommand::Help => write!(out, "{}", SlashCommand::help_text())?,
            SlashCommand::Memory | SlashCommand::Exit => {}
        }
        Ok(())
    }
}

/// Print an error, with a hint when the fix is a settings change.
fn report_error<W: Write>(out: &mut W, error: &ConversationError) -> std::io::Result<()> {
    writeln!(out, "Error: {error}")?;
    if error.gateway().is_some_and(GatewayError::is_configuration) {
        writeln!(
            out,
            "Check the API key and model (--api-key, --model or ~/chatrs/config.json)."
        )?;
    }
    Ok(())
}

fn log_usage(usage: Option<Usage>) {
    if let Some(usage) = usage {
        debug!(
            "Tokens: {} prompt + {} completion = {} total",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatrs_core::{ChatMessage, GenerationOptions, LLMResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replies "reply N" to the Nth call.
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LLMProvider for CountingProvider {
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: &GenerationOptions,
        ) -> Result<LLMResponse, GatewayError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(LLMResponse {
                content: format!("reply {n}"),
                usage: None,
            })
        }

        fn get_default_model(&self) -> &str {
            "llama-3.3-70b-versatile"
        }
    }

    fn manager() -> ConversationManager<CountingProvider> {
        ConversationManager::new(
            CountingProvider {
                calls: AtomicUsize::new(0),
            },
            ChatSettings::new("gsk_test", GenerationOptions::default()),
        )
    }

    #[tokio::test]
    async fn submit_appends_both_turns() {
        let mut manager = manager();
        let result = manager.submit("Hello").await.unwrap();

        assert_eq!(result.response, "reply 1");
        assert_eq!(result.turn_number, 1);
        assert_eq!(manager.session().history().len(), 2);
        assert_eq!(manager.session().memory().len(), 2);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut manager = manager();
        assert!(matches!(
            manager.submit("  ").await,
            Err(ConversationError::EmptyInput)
        ));
        assert!(manager.session().history().is_empty());
        assert_eq!(manager.provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_while_awaiting_is_busy() {
        let mut manager = manager();
        manager.session_mut().begin_request().unwrap();

        assert!(matches!(
            manager.submit("Hello").await,
            Err(ConversationError::Busy)
        ));
        assert!(manager.session().history().is_empty());
    }

    #[tokio::test]
    async fn interactive_loop_handles_commands() {
        let mut manager = manager();
        let input = b"Hello\n/retry\n/history\n/memory\n/bogus\n/reset\n/retry\nexit\n";
        let mut output = Vec::new();

        manager
            .run_with_io(&input[..], &mut output)
            .await
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("reply 1"));
        assert!(output.contains("reply 2"));
        assert!(output.contains("Assistant: reply 2 ("));
        assert!(output.contains("Memory display on."));
        assert!(output.contains("Unknown command '/bogus'"));
        assert!(output.contains("Session reset."));
        assert!(output.contains("Nothing to retry."));
        assert!(manager.session().history().is_empty());
    }

    #[tokio::test]
    async fn retry_while_awaiting_is_busy() {
        let mut manager = manager();
        manager.submit("Hello").await.unwrap();
        let before = manager.session().history().clone();
        manager.session_mut().begin_request().unwrap();

        assert!(matches!(
            manager.retry_last().await,
            Err(ConversationError::Busy)
        ));
        assert_eq!(*manager.session().history(), before);
        assert_eq!(manager.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_end_the_chat() {
        let mut manager = manager();
        let input = b"Hello\n\xff\xfe bad\n\xff\xfe\nafter\nexit\n";
        let mut output = Vec::new();

        manager
            .run_with_io(&input[..], &mut output)
            .await
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("not valid UTF-8").count(), 2);
        let texts: Vec<&str> = manager
            .session()
            .history()
            .turns()
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, ["Hello", "reply 1", "after", "reply 2"]);
    }

    #[tokio::test]
    async fn short_words_are_sent_as_messages() {
        let mut manager = manager();
        let mut output = Vec::new();

        manager
            .run_with_io(&b"q\nHello\n/exit\n"[..], &mut output)
            .await
            .unwrap();

        assert_eq!(manager.session().history().len(), 4);
        assert_eq!(manager.session().history().turns()[0].text, "q");
    }

    #[tokio::test]
    async fn configuration_errors_come_with_a_hint() {
        let mut manager = ConversationManager::new(
            CountingProvider {
                calls: AtomicUsize::new(0),
            },
            ChatSettings::default(),
        );
        let mut output = Vec::new();

        manager
            .run_with_io(&b"Hello\nexit\n"[..], &mut output)
            .await
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Error: Unauthorized"));
        assert!(output.contains("Check the API key and model"));
        assert!(manager.session().history().is_empty());
    }
}
