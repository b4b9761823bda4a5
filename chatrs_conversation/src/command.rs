use std::path::PathBuf;

/// Slash commands understood by the interactive loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Clear,
    Reset,
    Retry,
    Download(Option<PathBuf>),
    Memory,
    History,
    Help,
    Exit,
}

impl SlashCommand {
    /// Parse a line of input. Returns `None` for ordinary chat text.
    ///
    /// Unknown `/words` come back as `Some(Err(word))` so the loop can point at `/help`.
    #[must_use]
    pub fn parse_from_text(text: &str) -> Option<Result<Self, String>> {
        let text = text.trim();

        if matches!(text, "exit" | "quit") {
            return Some(Ok(Self::Exit));
        }

        let rest = text.strip_prefix('/')?;
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, arg)| (name, arg.trim()));

        let command = match name.to_lowercase().as_str() {
            "clear" => Self::Clear,
            "reset" => Self::Reset,
            "retry" => Self::Retry,
            "download" | "export" => {
                Self::Download((!arg.is_empty()).then(|| PathBuf::from(arg)))
            }
            "memory" => Self::Memory,
            "history" => Self::History,
            "help" => Self::Help,
            "exit" | "quit" => Self::Exit,
            other => return Some(Err(other.to_string())),
        };
        Some(Ok(command))
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"
Commands:
  /clear            Clear the chat
  /reset            Reset the session (chat and memory)
  /retry            Regenerate the last response
  /download [DIR]   Save the chat to chat_history.txt
  /memory           Toggle showing the memory buffer
  /history          Show the chat so far
  /help             Show this help
  /exit             Leave (also: exit, quit)

Anything else is sent to the model.
"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(SlashCommand::parse_from_text("hello there"), None);
        assert_eq!(SlashCommand::parse_from_text("what is 1/2?"), None);
        assert_eq!(SlashCommand::parse_from_text("q"), None);
        assert_eq!(SlashCommand::parse_from_text("exit now"), None);
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            SlashCommand::parse_from_text("/clear"),
            Some(Ok(SlashCommand::Clear))
        );
        assert_eq!(
            SlashCommand::parse_from_text("  /RETRY "),
            Some(Ok(SlashCommand::Retry))
        );
        assert_eq!(
            SlashCommand::parse_from_text("quit"),
            Some(Ok(SlashCommand::Exit))
        );
        assert_eq!(
            SlashCommand::parse_from_text("/download"),
            Some(Ok(SlashCommand::Download(None)))
        );
        assert_eq!(
            SlashCommand::parse_from_text("/download /tmp/chats"),
            Some(Ok(SlashCommand::Download(Some(PathBuf::from("/tmp/chats")))))
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(
            SlashCommand::parse_from_text("/frobnicate"),
            Some(Err("frobnicate".to_string()))
        );
    }
}
