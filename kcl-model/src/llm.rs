//! The completion model seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One single-turn completion request: a system prompt and a user prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model name sent to the provider.
    pub model: String,
    /// System instruction.
    pub system: String,
    /// User message.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Ceiling on generated tokens.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request with temperature `0.0` and a 1000-token ceiling.
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
            temperature: 0.0,
            max_tokens: 1000,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the generated token ceiling.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A language model that turns a [`CompletionRequest`] into text.
///
/// Each call is one round-trip to the backend. Implementations do not retry.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Provider name for logs and errors.
    fn name(&self) -> &str;

    /// Generate the full response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
