//! OpenAI chat completion client.
//!
//! Talks to `/v1/chat/completions` with `reqwest`. Any OpenAI-compatible
//! server works via [`OpenAIConfig::compatible`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::llm::{CompletionModel, CompletionRequest};

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "OpenAI";

/// Connection settings for [`OpenAIClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    /// Bearer token.
    pub api_key: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
}

impl OpenAIConfig {
    /// Settings for the public OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: OPENAI_API_BASE.to_string() }
    }

    /// Settings for an OpenAI-compatible server.
    pub fn compatible(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// OpenAI client for the standard API and OpenAI-compatible APIs.
pub struct OpenAIClient {
    client: reqwest::Client,
    config: OpenAIConfig,
}

impl OpenAIClient {
    /// Create a new OpenAI client.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the API key is empty.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ModelError::Config("API key must not be empty".to_string()));
        }
        Ok(Self { client: reqwest::Client::new(), config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

// ── OpenAI API request/response types ──

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl CompletionModel for OpenAIClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %request.model,
            prompt_chars = request.user.chars().count(),
            "requesting completion"
        );

        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                ModelError::Request { provider: PROVIDER.into(), message: e.to_string() }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(provider = PROVIDER, %status, "API error");
            return Err(ModelError::Api {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            ModelError::Request {
                provider: PROVIDER.into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        // A null `content` (e.g. a refusal) is returned as empty text and
        // left for the caller's answer parser to reject.
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::EmptyResponse { provider: PROVIDER.into() })?;
        Ok(choice.message.content.unwrap_or_default())
    }
}
