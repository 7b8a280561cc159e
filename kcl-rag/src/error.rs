//! Error types for the `kcl-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or querying the question index.
#[derive(Debug, Error)]
pub enum RagError {
    /// A raw answer label is not one of `1`-`4` or `A`-`D`.
    #[error("Invalid label: {0:?}")]
    InvalidLabel(String),

    /// A persisted index artifact is absent.
    #[error("Missing index artifact: {}. Run `kcl index` to build it first.", path.display())]
    MissingIndex {
        /// The artifact file that could not be found.
        path: PathBuf,
    },

    /// The persisted artifacts disagree on the number of documents.
    #[error(
        "Index artifacts are inconsistent: {texts} texts, {embeddings} embedding rows, \
         {indexed} indexed vectors. Rebuild the index."
    )]
    IndexCardinalityMismatch {
        /// Number of entries in the text list.
        texts: usize,
        /// Number of rows in the embedding matrix.
        embeddings: usize,
        /// Number of vectors held by the search structure.
        indexed: usize,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector did not match the dimensionality of the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality of the index.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// A dataset file could not be read or lacks a required column.
    #[error("Dataset error ({}): {message}", path.display())]
    DatasetError {
        /// The dataset file.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Reading or writing an artifact failed.
    #[error("I/O error ({}): {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be (de)serialized.
    #[error("Serialization error ({}): {source}", path.display())]
    Serialization {
        /// The artifact file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// A convenience result type for index and retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
