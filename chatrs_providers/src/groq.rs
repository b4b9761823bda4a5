use async_trait::async_trait;
use chatrs_core::{ChatMessage, GatewayError, GenerationOptions, LLMProvider, LLMResponse, Usage};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Gateway backed by Groq's OpenAI-compatible chat completions endpoint.
pub struct GroqProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqProvider {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        info!("Creating GroqProvider");
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request_body(messages: &[ChatMessage], options: &GenerationOptions) -> Value {
        let mut body = json!({
            "model": options.model.trim(),
            "messages": messages,
            "temperature": options.temperature,
        });
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    async fn try_send(&self, request: &Value) -> Result<LLMResponse, GatewayError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::NetworkFailure(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    GatewayError::NetworkFailure(format!("Connection failed: {e}"))
                } else {
                    GatewayError::NetworkFailure(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::NetworkFailure(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let error = classify_status(status.as_u16(), &body);
            warn!("Groq API returned HTTP {status}: {error}");
            return Err(error);
        }

        parse_completion(&body)
    }
}

/// Map a non-success HTTP status and its body onto the gateway taxonomy.
#[must_use]
pub fn classify_status(status: u16, body: &str) -> GatewayError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().map(|v| &v["error"]);
    let message = error
        .and_then(|e| e["message"].as_str())
        .map_or_else(|| body.trim().to_string(), str::to_string);
    let code = error.and_then(|e| e["code"].as_str()).unwrap_or_default();

    let model_problem = matches!(code, "model_not_found" | "model_decommissioned");

    match status {
        401 | 403 => GatewayError::Unauthorized(format!("Authentication failed: {message}")),
        429 => GatewayError::RateLimited(format!("Rate limit exceeded: {message}")),
        404 => GatewayError::InvalidModel(message),
        400 if model_problem => GatewayError::InvalidModel(message),
        500..=599 => GatewayError::NetworkFailure(format!("Server error {status}: {message}")),
        _ => GatewayError::Unexpected(format!("HTTP {status}: {message}")),
    }
}

/// Extract the reply and token usage from a chat completions body.
pub fn parse_completion(body: &str) -> Result<LLMResponse, GatewayError> {
    let response: Value = serde_json::from_str(body)
        .map_err(|e| GatewayError::Unexpected(format!("Failed to parse response: {e}")))?;

    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            GatewayError::Unexpected("Invalid response format: missing content".to_string())
        })?
        .to_string();

    let usage = response["usage"].as_object().map(|u| Usage {
        prompt_tokens: u32::try_from(u["prompt_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
        completion_tokens: u32::try_from(u["completion_tokens"].as_u64().unwrap_or(0))
            .unwrap_or(0),
        total_tokens: u32::try_from(u["total_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for GroqProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<LLMResponse, GatewayError> {
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::missing_api_key());
        }

        let request = Self::request_body(messages, options);

        info!("Sending request to Groq API: model={}", options.model);
        let response = self.try_send(&request).await?;

        if let Some(usage) = response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!("Received response from Groq API");
        Ok(response)
    }

    fn get_default_model(&self) -> &'static str {
        chatrs_core::models::DEFAULT_MODEL
    }
}
