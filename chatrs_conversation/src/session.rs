//! Session state for one chat.
//!
//! A session owns the transcript, the memory buffer mirrored from it and the
//! settings requests are made with. It lives for as long as the chat loop
//! runs and is re-created from scratch on reset.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use chatrs_core::util::{DEFAULT_SYSTEM_PROMPT, mask_secret};
use chatrs_core::{ClearPolicy, Exchange, GenerationOptions, MemoryBuffer, Role, Turn};

use crate::ConversationError;
use crate::history::History;

/// Whether a request is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// Everything a request is made with.
#[derive(Clone)]
pub struct ChatSettings {
    pub api_key: String,
    pub options: GenerationOptions,
    pub system_prompt: String,
    pub clear_policy: ClearPolicy,
}

impl ChatSettings {
    #[must_use]
    pub fn new(api_key: impl Into<String>, options: GenerationOptions) -> Self {
        Self {
            api_key: api_key.into(),
            options,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            clear_policy: ClearPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub const fn with_clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::new(String::new(), GenerationOptions::default())
    }
}

// Keep the key out of debug output and logs.
impl fmt::Debug for ChatSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSettings")
            .field("api_key", &mask_secret(&self.api_key))
            .field("options", &self.options)
            .field("system_prompt", &self.system_prompt)
            .field("clear_policy", &self.clear_policy)
            .finish()
    }
}

/// A chat session: transcript, memory and settings.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    history: History,
    memory: MemoryBuffer,
    settings: ChatSettings,
    state: SessionState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatSession {
    #[must_use]
    pub fn new(settings: ChatSettings) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            history: History::new(),
            memory: MemoryBuffer::new(),
            settings,
            state: SessionState::Idle,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append the user's message. Blank input is rejected and nothing is appended.
    pub fn append_user_turn(&mut self, text: &str) -> Result<&Turn, ConversationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConversationError::EmptyInput);
        }
        self.updated_at = Utc::now();
        Ok(self.history.append(Role::User, text))
    }

    /// Append an assistant message to the transcript only.
    ///
    /// Memory follows through [`Self::complete_exchange`], which applies the
    /// delta returned by the gateway in the same step.
    pub fn append_assistant_turn(&mut self, text: &str) -> &Turn {
        self.updated_at = Utc::now();
        self.history.append(Role::Assistant, text)
    }

    /// Record a successful gateway reply: assistant turn plus memory delta.
    pub fn complete_exchange(&mut self, exchange: Exchange) -> &Turn {
        self.memory.apply(exchange.delta);
        self.append_assistant_turn(&exchange.reply)
    }

    /// The user text a retry would resubmit, when the transcript ends in a
    /// `(user, assistant)` pair.
    #[must_use]
    pub fn retry_prompt(&self) -> Option<&str> {
        self.history
            .trailing_exchange()
            .map(|(user, _)| user.text.as_str())
    }

    /// Swap the last reply for a regenerated one, in transcript and memory alike.
    pub fn complete_retry(&mut self, exchange: Exchange) -> Option<&Turn> {
        self.history.trailing_exchange()?;
        self.memory.replace_last_exchange(exchange.delta);
        self.updated_at = Utc::now();
        self.history.replace_last_assistant(exchange.reply)
    }

    /// Move to `AwaitingResponse`, refusing a second request while one is pending.
    pub fn begin_request(&mut self) -> Result<(), ConversationError> {
        if self.state == SessionState::AwaitingResponse {
            return Err(ConversationError::Busy);
        }
        self.state = SessionState::AwaitingResponse;
        Ok(())
    }

    pub fn finish_request(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Empty the transcript; memory is cleared too unless the policy is display-only.
    pub fn clear(&mut self) {
        self.history.clear();
        if self.settings.clear_policy.clears_memory() {
            self.memory.clear();
        }
        self.updated_at = Utc::now();
        debug!(
            "Cleared session {} (policy: {})",
            self.id, self.settings.clear_policy
        );
    }

    /// Start over: fresh id, empty transcript and memory. Settings are kept.
    pub fn reset(&mut self) {
        let settings = self.settings.clone();
        *self = Self::new(settings);
        debug!("Reset to new session {}", self.id);
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub const fn memory(&self) -> &MemoryBuffer {
        &self.memory
    }

    #[must_use]
    pub const fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub const fn settings_mut(&mut self) -> &mut ChatSettings {
        &mut self.settings
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Number of user turns so far.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.history
            .turns()
            .iter()
            .filter(|t| t.role == Role::User)
            .count()
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(ChatSettings::default())
    }
}
