//! # kcl-model
//!
//! Completion model integrations for the kcl question-answering pipeline.
//!
//! ## Overview
//!
//! The pipeline only needs one operation from a language model: turn a
//! system prompt and a user prompt into text. That seam is
//! [`CompletionModel`]. This crate provides:
//!
//! - [`OpenAIClient`] - OpenAI chat completions (GPT-4o, GPT-4o-mini, etc.)
//!   and OpenAI-compatible servers
//! - [`MockLlm`] - Scripted model for testing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kcl_model::{CompletionModel, CompletionRequest};
//! use kcl_model::openai::{OpenAIClient, OpenAIConfig};
//!
//! let model = OpenAIClient::new(OpenAIConfig::new(std::env::var("OPENAI_API_KEY")?))?;
//! let request = CompletionRequest::new("gpt-4o-mini", "You are terse.", "2 + 2?")
//!     .with_temperature(0.1)
//!     .with_max_tokens(1000);
//! let text = model.complete(request).await?;
//! ```

pub mod error;
pub mod llm;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use error::{ModelError, Result};
pub use llm::{CompletionModel, CompletionRequest};
pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::{OpenAIClient, OpenAIConfig};
