//! The user-visible transcript.
//!
//! Turns are only ever appended, except that a retry swaps the final
//! assistant turn for a regenerated one.

use chatrs_core::{Role, Turn};

/// Ordered transcript of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn stamped now and return it.
    pub fn append(&mut self, role: Role, text: impl Into<String>) -> &Turn {
        self.push(Turn::new(role, text))
    }

    pub fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// The trailing `(user, assistant)` pair, if the transcript ends with one.
    #[must_use]
    pub fn trailing_exchange(&self) -> Option<(&Turn, &Turn)> {
        match self.turns.as_slice() {
            [.., user, assistant] if user.role == Role::User && assistant.role == Role::Assistant => {
                Some((user, assistant))
            }
            _ => None,
        }
    }

    /// Replace the final assistant turn of a trailing exchange with a freshly
    /// stamped one. Returns `None` and leaves the transcript alone otherwise.
    pub fn replace_last_assistant(&mut self, text: impl Into<String>) -> Option<&Turn> {
        self.trailing_exchange()?;
        let last = self.turns.last_mut()?;
        *last = Turn::new(Role::Assistant, text);
        Some(last)
    }

    /// Export lines, one per turn, each ending in `\n`.
    ///
    /// The iterator borrows the transcript and can be recreated at will.
    pub fn export_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.turns.iter().map(|turn| format!("{}\n", turn.export_line()))
    }

    #[must_use]
    pub fn format_for_export(&self) -> String {
        self.export_lines().collect()
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        let total_chars: usize = self.turns.iter().map(|t| t.text.len()).sum();
        let user_count = self.turns.iter().filter(|t| t.role == Role::User).count();
        let assistant_count = self
            .turns
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .count();

        HistoryStats {
            total_turns: self.turns.len(),
            user_turns: user_count,
            assistant_turns: assistant_count,
            total_characters: total_chars,
            estimated_tokens: total_chars / 4, // Rough estimate: 4 chars per token
        }
    }
}

impl From<Vec<Turn>> for History {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

/// Statistics about the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub assistant_turns: usize,
    pub total_characters: usize,
    pub estimated_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> History {
        History::from(vec![
            Turn::with_timestamp(Role::User, "hi", "t1"),
            Turn::with_timestamp(Role::Assistant, "hello", "t2"),
        ])
    }

    #[test]
    fn export_format() {
        assert_eq!(
            sample().format_for_export(),
            "User: hi (t1)\nAssistant: hello (t2)\n"
        );
        assert_eq!(History::new().format_for_export(), "");
    }

    #[test]
    fn export_lines_are_restartable() {
        let history = sample();
        let first: Vec<String> = history.export_lines().collect();
        let second: Vec<String> = history.export_lines().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn appends_preserve_order() {
        let mut history = History::new();
        for i in 0..6 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            history.append(role, format!("message {i}"));
        }

        assert_eq!(history.len(), 6);
        let texts: Vec<&str> = history.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            ["message 0", "message 1", "message 2", "message 3", "message 4", "message 5"]
        );
    }

    #[test]
    fn trailing_exchange_detection() {
        assert!(History::new().trailing_exchange().is_none());
        assert!(sample().trailing_exchange().is_some());

        let mut dangling = sample();
        dangling.append(Role::User, "still there?");
        assert!(dangling.trailing_exchange().is_none());

        let only_assistant = History::from(vec![Turn::with_timestamp(Role::Assistant, "x", "t")]);
        assert!(only_assistant.trailing_exchange().is_none());
    }

    #[test]
    fn replace_last_assistant_keeps_length() {
        let mut history = sample();
        let replaced = history.replace_last_assistant("hey").cloned();

        assert_eq!(history.len(), 2);
        assert_eq!(replaced.map(|t| t.text), Some("hey".to_string()));
        assert_ne!(history.turns()[1].timestamp, "t2");
        assert_eq!(history.turns()[0], Turn::with_timestamp(Role::User, "hi", "t1"));
    }

    #[test]
    fn replace_without_exchange_is_noop() {
        let mut history = History::new();
        history.append(Role::User, "hi");
        let before = history.clone();

        assert!(history.replace_last_assistant("nope").is_none());
        assert_eq!(history, before);
    }

    #[test]
    fn stats_counts_roles() {
        let stats = sample().stats();
        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.user_turns, 1);
        assert_eq!(stats.assistant_turns, 1);
        assert_eq!(stats.total_characters, 7);
    }
}
