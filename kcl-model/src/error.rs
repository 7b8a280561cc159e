//! Error types for the `kcl-model` crate.

use thiserror::Error;

/// Errors returned by completion models.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The client is misconfigured (e.g. a missing API key).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP request could not be sent or its body could not be read.
    #[error("Request to {provider} failed: {message}")]
    Request {
        /// The provider being called.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("{provider} API returned {status}: {message}")]
    Api {
        /// The provider being called.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// The response contained no generated text.
    #[error("{provider} returned an empty completion")]
    EmptyResponse {
        /// The provider being called.
        provider: String,
    },
}

/// Result type alias for completion calls.
pub type Result<T> = std::result::Result<T, ModelError>;
