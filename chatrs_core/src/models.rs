//! Model allow-list and per-request generation options.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::GatewayError;

/// Models the chat client is allowed to request.
pub const SUPPORTED_MODELS: [&str; 3] = [
    "llama-3.3-70b-versatile",
    "moonshotai/kimi-k2-instruct-0905",
    "openai/gpt-oss-120b",
];

pub const DEFAULT_MODEL: &str = SUPPORTED_MODELS[0];

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_MAX_TOKENS: u32 = 150;

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;

pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 50..=300;

/// Request timeout used when the config file does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[must_use]
pub fn is_supported_model(model: &str) -> bool {
    SUPPORTED_MODELS.contains(&model.trim())
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }
}

impl GenerationOptions {
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Reject a model outside the allow-list before any request is made.
    pub fn ensure_supported_model(&self) -> Result<(), GatewayError> {
        if is_supported_model(&self.model) {
            Ok(())
        } else {
            Err(GatewayError::InvalidModel(format!(
                "'{}' is not one of: {}",
                self.model,
                SUPPORTED_MODELS.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_ignores_surrounding_whitespace() {
        assert!(is_supported_model("llama-3.3-70b-versatile "));
        assert!(is_supported_model("openai/gpt-oss-120b"));
        assert!(!is_supported_model("gpt-4o"));
    }

    #[test]
    fn unsupported_model_is_invalid_model() {
        let options = GenerationOptions::default().with_model("glm-4-flash");
        assert!(matches!(
            options.ensure_supported_model(),
            Err(GatewayError::InvalidModel(_))
        ));
        assert!(GenerationOptions::default().ensure_supported_model().is_ok());
    }

    #[test]
    fn defaults_fall_inside_ranges() {
        let options = GenerationOptions::default();
        assert!(TEMPERATURE_RANGE.contains(&options.temperature));
        assert!(options.max_tokens.is_some_and(|n| MAX_TOKENS_RANGE.contains(&n)));
    }
}
