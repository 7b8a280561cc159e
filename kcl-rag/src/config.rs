//! Configuration for indexing, retrieval, and generation.

use serde::{Deserialize, Serialize};

use crate::builder::DEFAULT_BUILD_NEIGHBORS;
use crate::context::DEFAULT_MAX_CONTEXT_CHARS;
use crate::error::{RagError, Result};

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default generation model.
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

/// Configuration parameters for the retrieval-augmented pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Number of documents retrieved per question. Zero disables retrieval.
    pub top_k: usize,
    /// Maximum number of characters of assembled context.
    pub max_context_chars: usize,
    /// Default neighbor count stored in the fitted index (clamped to the corpus size).
    pub build_neighbors: usize,
    /// Number of questions evaluated concurrently.
    pub concurrency: usize,
    /// Sampling temperature for generation.
    pub temperature: f32,
    /// Maximum number of generated tokens.
    pub max_tokens: u32,
    /// Embedding model name.
    pub embedding_model: String,
    /// Generation model name.
    pub generation_model: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            build_neighbors: DEFAULT_BUILD_NEIGHBORS,
            concurrency: 10,
            temperature: 0.1,
            max_tokens: 1000,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the number of documents retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the context character budget.
    pub fn max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Set the neighbor count stored in the fitted index.
    pub fn build_neighbors(mut self, neighbors: usize) -> Self {
        self.config.build_neighbors = neighbors;
        self
    }

    /// Set how many questions are evaluated at once.
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.config.concurrency = workers;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the generated token ceiling.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the embedding model name.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the generation model name.
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.config.generation_model = model.into();
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `max_context_chars == 0`
    /// - `build_neighbors == 0`
    /// - `concurrency == 0`
    /// - `max_tokens == 0`
    /// - `temperature` is negative or not finite
    pub fn build(self) -> Result<RagConfig> {
        let c = &self.config;
        if c.max_context_chars == 0 {
            return Err(RagError::ConfigError(
                "max_context_chars must be greater than zero".to_string(),
            ));
        }
        if c.build_neighbors == 0 {
            return Err(RagError::ConfigError(
                "build_neighbors must be greater than zero".to_string(),
            ));
        }
        if c.concurrency == 0 {
            return Err(RagError::ConfigError("concurrency must be greater than zero".to_string()));
        }
        if c.max_tokens == 0 {
            return Err(RagError::ConfigError("max_tokens must be greater than zero".to_string()));
        }
        if !c.temperature.is_finite() || c.temperature < 0.0 {
            return Err(RagError::ConfigError(format!(
                "temperature must be a non-negative number, got {}",
                c.temperature
            )));
        }
        Ok(self.config)
    }
}
