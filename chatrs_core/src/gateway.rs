//! One request/response exchange with the model gateway.
//!
//! The gateway never touches session memory. It hands back the reply together
//! with the [`MemoryDelta`] the caller applies once the reply is accepted.

use tracing::debug;

use crate::{
    ChatMessage, GatewayError, GenerationOptions, LLMProvider, MemoryBuffer, MemoryDelta, Role,
    Usage,
};

/// Outcome of a successful gateway call.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub reply: String,
    pub usage: Option<Usage>,
    pub delta: MemoryDelta,
}

/// Build the request payload: system prompt, remembered messages, then the prompt.
#[must_use]
pub fn build_messages(system_prompt: &str, memory: &MemoryBuffer, prompt: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(memory.len() + 2);
    if !system_prompt.is_empty() {
        messages.push(ChatMessage::new(Role::System, system_prompt));
    }
    messages.extend(memory.messages().iter().cloned());
    messages.push(ChatMessage::new(Role::User, prompt));
    messages
}

/// Send `prompt` with `memory` as context and return the reply.
///
/// A blank reply is reported as [`GatewayError::EmptyResponse`] so no empty
/// assistant turn ever reaches the transcript.
pub async fn generate<P>(
    provider: &P,
    system_prompt: &str,
    prompt: &str,
    memory: &MemoryBuffer,
    options: &GenerationOptions,
) -> Result<Exchange, GatewayError>
where
    P: LLMProvider + ?Sized,
{
    options.ensure_supported_model()?;

    let messages = build_messages(system_prompt, memory, prompt);
    debug!(
        "Sending {} messages ({} from memory) to model {}",
        messages.len(),
        memory.len(),
        options.model
    );

    let response = provider.chat(&messages, options).await?;
    let reply = response.content.trim().to_string();
    if reply.is_empty() {
        return Err(GatewayError::EmptyResponse);
    }

    Ok(Exchange {
        delta: MemoryDelta::new(prompt, reply.clone()),
        reply,
        usage: response.usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LLMResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoProvider {
        reply: String,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl EchoProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _options: &GenerationOptions,
        ) -> Result<LLMResponse, GatewayError> {
            if let Ok(mut seen) = self.seen.lock() {
                *seen = messages.to_vec();
            }
            Ok(LLMResponse {
                content: self.reply.clone(),
                usage: None,
            })
        }

        fn get_default_model(&self) -> &str {
            "llama-3.3-70b-versatile"
        }
    }

    #[tokio::test]
    async fn generate_sends_memory_and_returns_delta() {
        let provider = EchoProvider::new("  Hello there!  ");
        let mut memory = MemoryBuffer::new();
        memory.apply(MemoryDelta::new("earlier", "reply"));

        let exchange = generate(
            &provider,
            "be nice",
            "Hello",
            &memory,
            &GenerationOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(exchange.reply, "Hello there!");
        assert_eq!(exchange.delta, MemoryDelta::new("Hello", "Hello there!"));

        let seen = provider.seen.lock().unwrap().clone();
        let roles: Vec<Role> = seen.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(seen[3].content, "Hello");
        // Memory itself is left alone.
        assert_eq!(memory.len(), 2);
    }

    #[tokio::test]
    async fn blank_reply_is_an_error() {
        let provider = EchoProvider::new("   ");
        let result = generate(
            &provider,
            "",
            "Hello",
            &MemoryBuffer::new(),
            &GenerationOptions::default(),
        )
        .await;
        assert_eq!(result.err(), Some(GatewayError::EmptyResponse));
    }

    #[tokio::test]
    async fn unsupported_model_never_reaches_provider() {
        let provider = EchoProvider::new("hi");
        let options = GenerationOptions::default().with_model("not-a-model");
        let result = generate(&provider, "", "Hello", &MemoryBuffer::new(), &options).await;

        assert!(matches!(result, Err(GatewayError::InvalidModel(_))));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn build_messages_skips_empty_system_prompt() {
        let messages = build_messages("", &MemoryBuffer::new(), "hi");
        assert_eq!(messages, vec![ChatMessage::new(Role::User, "hi")]);
    }
}
