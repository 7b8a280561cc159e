//! The retrieve → assemble → generate pipeline for a single question.

use std::sync::Arc;

use async_trait::async_trait;
use kcl_rag::{RagConfig, Retriever, assemble_context};
use tracing::debug;

use crate::error::Result;
use crate::generator::AnswerGenerator;

/// Anything that can answer a formatted question block with raw model text.
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    /// Produce the full generated text (reasoning and final line).
    async fn answer(&self, question_block: &str) -> Result<String>;
}

/// Answers questions with retrieved training questions as context.
#[derive(Debug, Clone)]
pub struct RagAnswerer {
    retriever: Arc<Retriever>,
    generator: AnswerGenerator,
    top_k: usize,
    max_context_chars: usize,
}

impl RagAnswerer {
    /// Create an answerer using `config.top_k` and `config.max_context_chars`.
    pub fn new(retriever: Arc<Retriever>, generator: AnswerGenerator, config: &RagConfig) -> Self {
        Self {
            retriever,
            generator,
            top_k: config.top_k,
            max_context_chars: config.max_context_chars,
        }
    }

    /// Retrieve and assemble the context for `question_block`.
    ///
    /// Returns an empty context when `top_k` is zero.
    pub async fn context_for(&self, question_block: &str) -> Result<String> {
        if self.top_k == 0 {
            return Ok(String::new());
        }
        let hits = self.retriever.query(question_block, self.top_k).await?;
        let documents: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        let context = assemble_context(&documents, self.max_context_chars);
        debug!(hits = hits.len(), context_chars = context.chars().count(), "assembled context");
        Ok(context)
    }
}

#[async_trait]
impl QuestionAnswerer for RagAnswerer {
    async fn answer(&self, question_block: &str) -> Result<String> {
        let context = self.context_for(question_block).await?;
        self.generator.generate(question_block, &context).await
    }
}
