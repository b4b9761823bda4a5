//! A single transcript entry.

use serde::{Deserialize, Serialize};

use crate::util::timestamp_now;
use crate::{ChatMessage, Role};

/// One message exchanged by the user or the assistant.
///
/// The timestamp is always present and kept as the rendered string so exports
/// reproduce exactly what was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: String,
}

impl Turn {
    /// Create a turn stamped with the current local time.
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self::with_timestamp(role, text, timestamp_now())
    }

    #[must_use]
    pub fn with_timestamp(role: Role, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Export line without the trailing newline: `User: hi (2024-01-01 10:00:00)`.
    #[must_use]
    pub fn export_line(&self) -> String {
        format!("{}: {} ({})", self.role, self.text, self.timestamp)
    }

    #[must_use]
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_line_format() {
        let turn = Turn::with_timestamp(Role::User, "hi", "t1");
        assert_eq!(turn.export_line(), "User: hi (t1)");
    }

    #[test]
    fn new_turn_has_second_precision_timestamp() {
        let turn = Turn::new(Role::Assistant, "hello");
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(turn.timestamp.len(), 19);
        assert_eq!(turn.to_message(), ChatMessage::new(Role::Assistant, "hello"));
    }
}
