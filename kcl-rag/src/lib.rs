//! # kcl-rag
//!
//! Semantic index and retrieval for Korean criminal-law multiple-choice questions.
//!
//! ## Overview
//!
//! Training questions are rendered as documents (question plus lettered
//! options, never the answer), embedded with an [`EmbeddingProvider`],
//! L2-normalized, and stored in a flat cosine [`FlatIndex`]. Three artifacts
//! are persisted side by side:
//!
//! | Artifact | File | Content |
//! |----------|------|---------|
//! | texts | `texts.json` | documents in ID order |
//! | embeddings | `embeddings.json` | row-major `f32` matrix |
//! | search structure | `nn.json` | fitted flat index |
//!
//! At query time a [`Retriever`] loads them once, embeds the query, and
//! returns the nearest documents; [`assemble_context`] joins them under a
//! character budget.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kcl_rag::{Embedder, IndexBuilder, IndexPaths, Retriever, assemble_context};
//! use kcl_rag::openai::OpenAIEmbeddingProvider;
//!
//! let embedder = Embedder::new(Arc::new(OpenAIEmbeddingProvider::new(api_key)?));
//! let paths = IndexPaths::in_dir("outputs");
//!
//! IndexBuilder::new(embedder.clone(), paths.clone())
//!     .build_from_files(&["data/Criminal-Law-train.csv".into()])
//!     .await?;
//!
//! let retriever = Retriever::new(embedder, paths);
//! let hits = retriever.query("살인죄에 대한 설명으로 옳은 것은?", 5).await?;
//! let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
//! let context = assemble_context(&texts, 15_000);
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod dataset;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod label;
#[cfg(feature = "openai")]
pub mod openai;
pub mod retriever;

pub use builder::{DEFAULT_BUILD_NEIGHBORS, IndexBuildOutcome, IndexBuilder};
pub use config::{RagConfig, RagConfigBuilder};
pub use context::{DEFAULT_MAX_CONTEXT_CHARS, assemble_context};
pub use dataset::{Dataset, REQUIRED_COLUMNS};
pub use document::{QuestionRecord, RetrievalHit};
pub use embedding::{Embedder, EmbeddingMatrix, EmbeddingProvider, l2_normalize};
pub use error::{RagError, Result};
pub use index::{FlatIndex, IndexArtifacts, IndexPaths, Metric, Neighbor};
pub use label::{AnswerLetter, normalize_label};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
pub use retriever::Retriever;
