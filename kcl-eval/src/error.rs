//! Error types for the `kcl-eval` crate.

use thiserror::Error;

/// Errors raised while answering or evaluating questions.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The generated text contains no recognizable answer letter.
    #[error("Failed to parse answer from model output: {text:?}")]
    ParseFailure {
        /// The offending model output.
        text: String,
    },

    /// Retrieval, indexing, labels, or dataset I/O failed.
    #[error(transparent)]
    Rag(#[from] kcl_rag::RagError),

    /// The completion model failed.
    #[error(transparent)]
    Model(#[from] kcl_model::ModelError),
}

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;
