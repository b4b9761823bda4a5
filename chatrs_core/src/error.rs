//! Failure taxonomy of the model gateway.

use thiserror::Error;

/// Why a gateway call produced no reply.
///
/// None of these are fatal: the session returns to idle and the user may
/// re-enter a key, change model, resubmit or retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Unexpected gateway response: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Error surfaced when no API key has been configured.
    #[must_use]
    pub fn missing_api_key() -> Self {
        Self::Unauthorized(
            "no API key configured (set it with --api-key, GROQ_API_KEY or the config file)"
                .to_string(),
        )
    }

    /// Transient failures leave the conversation untouched and are worth resubmitting.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::NetworkFailure(_))
    }

    /// Failures that need a configuration change before the next attempt.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::InvalidModel(_))
    }
}
