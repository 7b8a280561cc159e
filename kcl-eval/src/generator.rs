//! Answer generation: prompt construction plus one completion call.

use std::sync::Arc;

use kcl_model::{CompletionModel, CompletionRequest};
use kcl_rag::RagConfig;
use tracing::debug;

use crate::error::Result;
use crate::prompt::{SYSTEM_PROMPT, user_prompt};

/// Sampling parameters for answer generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// Model name sent to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Ceiling on generated tokens.
    pub max_tokens: u32,
}

impl From<&RagConfig> for GenerationSettings {
    fn from(config: &RagConfig) -> Self {
        Self {
            model: config.generation_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&RagConfig::default())
    }
}

/// Asks a completion model to reason over retrieved context and pick an option.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn CompletionModel>,
    settings: GenerationSettings,
}

impl AnswerGenerator {
    /// Create a generator.
    pub fn new(model: Arc<dyn CompletionModel>, settings: GenerationSettings) -> Self {
        Self { model, settings }
    }

    /// The sampling parameters in use.
    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Build the completion request for one question.
    pub fn request(&self, question_block: &str, context: &str) -> CompletionRequest {
        CompletionRequest::new(
            self.settings.model.clone(),
            SYSTEM_PROMPT,
            user_prompt(context, question_block),
        )
        .with_temperature(self.settings.temperature)
        .with_max_tokens(self.settings.max_tokens)
    }

    /// Generate the model's reasoning and final answer line.
    ///
    /// The text is returned unmodified; use
    /// [`parse_answer`](crate::parse_answer) to extract the letter.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Model`](crate::EvalError::Model) if the model call fails.
    pub async fn generate(&self, question_block: &str, context: &str) -> Result<String> {
        let request = self.request(question_block, context);
        debug!(
            model = %request.model,
            context_chars = context.chars().count(),
            "generating answer"
        );
        Ok(self.model.complete(request).await?)
    }
}

impl std::fmt::Debug for AnswerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerGenerator")
            .field("model", &self.model.name())
            .field("settings", &self.settings)
            .finish()
    }
}
