#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod gateway;
pub mod memory;
pub mod models;
pub mod policy;
pub mod turn;
pub mod util;

pub use error::GatewayError;
pub use gateway::{Exchange, generate};
pub use memory::{MemoryBuffer, MemoryDelta};
pub use models::{GenerationOptions, SUPPORTED_MODELS, is_supported_model};
pub use policy::ClearPolicy;
pub use turn::Turn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Capitalised label used in transcripts and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
            Self::System => "System",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The hosted model endpoint every reply is delegated to.
///
/// Implementations perform exactly one request per call. Retrying is left to
/// the user.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<LLMResponse, GatewayError>;

    fn get_default_model(&self) -> &str;
}

#[async_trait]
impl<T> LLMProvider for std::sync::Arc<T>
where
    T: LLMProvider + ?Sized,
{
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<LLMResponse, GatewayError> {
        (**self).chat(messages, options).await
    }

    fn get_default_model(&self) -> &str {
        (**self).get_default_model()
    }
}
