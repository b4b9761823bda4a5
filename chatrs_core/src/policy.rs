//! What the clear action wipes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether clearing the transcript also makes the model forget it.
///
/// Reset always wipes both; this only governs clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Clear the transcript and the memory buffer together.
    #[default]
    ClearBoth,
    /// Clear the transcript only; the model keeps its memory.
    DisplayOnly,
}

impl ClearPolicy {
    #[must_use]
    pub const fn clears_memory(self) -> bool {
        matches!(self, Self::ClearBoth)
    }
}

impl fmt::Display for ClearPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ClearBoth => "clear-both",
            Self::DisplayOnly => "display-only",
        })
    }
}

impl FromStr for ClearPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "clear-both" | "both" => Ok(Self::ClearBoth),
            "display-only" | "display" => Ok(Self::DisplayOnly),
            other => Err(format!(
                "unknown clear policy '{other}' (expected clear-both or display-only)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_and_config_spellings() {
        assert_eq!("clear-both".parse::<ClearPolicy>(), Ok(ClearPolicy::ClearBoth));
        assert_eq!("display_only".parse::<ClearPolicy>(), Ok(ClearPolicy::DisplayOnly));
        assert!("everything".parse::<ClearPolicy>().is_err());
    }

    #[test]
    fn default_clears_memory() {
        assert!(ClearPolicy::default().clears_memory());
        assert!(!ClearPolicy::DisplayOnly.clears_memory());
    }
}
