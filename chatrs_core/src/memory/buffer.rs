//! Conversation memory fed back to the model on every request.
//!
//! The buffer is a cache of the transcript in wire form. It only ever holds
//! completed exchanges: a user message that never got a reply is not part of
//! memory.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ChatMessage, Role, Turn};

/// The messages one successful exchange adds to memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDelta {
    pub user: ChatMessage,
    pub assistant: ChatMessage,
}

impl MemoryDelta {
    #[must_use]
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: ChatMessage::new(Role::User, user),
            assistant: ChatMessage::new(Role::Assistant, assistant),
        }
    }
}

/// Ordered, role-tagged messages mirrored from the transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBuffer {
    messages: Vec<ChatMessage>,
}

impl MemoryBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Rebuild memory from a transcript.
    ///
    /// Every user turn immediately followed by an assistant turn contributes
    /// both messages; anything else is skipped.
    #[must_use]
    pub fn from_turns(turns: &[Turn]) -> Self {
        let mut messages = Vec::with_capacity(turns.len());
        let mut i = 0;
        while i < turns.len() {
            match (turns[i].role, turns.get(i + 1).map(|t| t.role)) {
                (Role::User, Some(Role::Assistant)) => {
                    messages.push(turns[i].to_message());
                    messages.push(turns[i + 1].to_message());
                    i += 2;
                }
                _ => i += 1,
            }
        }
        Self { messages }
    }

    pub fn apply(&mut self, delta: MemoryDelta) {
        self.messages.push(delta.user);
        self.messages.push(delta.assistant);
    }

    /// Whether the buffer ends with a user message answered by an assistant message.
    #[must_use]
    pub fn ends_with_exchange(&self) -> bool {
        let n = self.messages.len();
        n >= 2
            && self.messages[n - 2].role == Role::User
            && self.messages[n - 1].role == Role::Assistant
    }

    /// A copy of the buffer without its trailing exchange.
    ///
    /// This is the context a retried request is sent with.
    #[must_use]
    pub fn rewound(&self) -> Self {
        let mut copy = self.clone();
        copy.drop_last_exchange();
        copy
    }

    /// Swap the trailing exchange for a regenerated one.
    pub fn replace_last_exchange(&mut self, delta: MemoryDelta) {
        self.drop_last_exchange();
        self.apply(delta);
    }

    fn drop_last_exchange(&mut self) {
        if self.ends_with_exchange() {
            self.messages.truncate(self.messages.len() - 2);
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl fmt::Display for MemoryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            return writeln!(f, "(memory is empty)");
        }
        for (i, msg) in self.messages.iter().enumerate() {
            writeln!(f, "[{i}] {}: {}", msg.role, msg.content)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: Role, text: &str) -> Turn {
        Turn::with_timestamp(role, text, "t")
    }

    #[test]
    fn from_turns_keeps_only_completed_exchanges() {
        let turns = vec![
            turn(Role::User, "hi"),
            turn(Role::Assistant, "hello"),
            turn(Role::User, "unanswered"),
            turn(Role::User, "again"),
            turn(Role::Assistant, "sorry"),
        ];

        let memory = MemoryBuffer::from_turns(&turns);
        let contents: Vec<&str> = memory.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["hi", "hello", "again", "sorry"]);
    }

    #[test]
    fn apply_matches_rebuild() {
        let mut memory = MemoryBuffer::new();
        memory.apply(MemoryDelta::new("hi", "hello"));

        let rebuilt =
            MemoryBuffer::from_turns(&[turn(Role::User, "hi"), turn(Role::Assistant, "hello")]);
        assert_eq!(memory, rebuilt);
        assert!(memory.ends_with_exchange());
    }

    #[test]
    fn rewound_drops_only_trailing_exchange() {
        let mut memory = MemoryBuffer::new();
        memory.apply(MemoryDelta::new("a", "b"));
        memory.apply(MemoryDelta::new("c", "d"));

        let rewound = memory.rewound();
        assert_eq!(rewound.len(), 2);
        assert_eq!(rewound.messages()[1].content, "b");
        assert_eq!(memory.len(), 4);
        assert!(MemoryBuffer::new().rewound().is_empty());
    }

    #[test]
    fn replace_last_exchange() {
        let mut memory = MemoryBuffer::new();
        memory.apply(MemoryDelta::new("q", "first"));
        memory.replace_last_exchange(MemoryDelta::new("q", "second"));

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.messages()[1].content, "second");
    }

    #[test]
    fn display_lists_messages() {
        let mut memory = MemoryBuffer::new();
        assert_eq!(memory.to_string(), "(memory is empty)\n");
        memory.apply(MemoryDelta::new("hi", "hello"));
        assert_eq!(memory.to_string(), "[0] User: hi\n[1] Assistant: hello\n");
    }
}
