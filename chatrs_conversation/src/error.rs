use chatrs_core::GatewayError;
use thiserror::Error;

/// Errors surfaced by the session state manager.
///
/// Every variant is recoverable: the session is back in idle when one is returned.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Empty input ignored")]
    EmptyInput,

    #[error("A response is still pending; wait for it before sending another message")]
    Busy,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversationError {
    /// The gateway failure behind this error, if any.
    #[must_use]
    pub const fn gateway(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(e) => Some(e),
            _ => None,
        }
    }
}
