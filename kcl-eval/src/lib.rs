//! # kcl-eval
//!
//! Answer generation and accuracy evaluation for Korean criminal-law
//! multiple-choice questions.
//!
//! ## Overview
//!
//! - [`AnswerGenerator`] builds the reasoning prompt around retrieved context
//!   and returns the model's full output.
//! - [`parse_answer`] extracts the final option letter from that output.
//! - [`RagAnswerer`] chains retrieval, context assembly, and generation.
//! - [`Evaluator`] runs an answerer over a dataset with bounded concurrency,
//!   keeps input order, and turns per-row failures into an `"Error"`
//!   prediction instead of aborting.
//! - [`run_baseline`] scores random and majority-label baselines.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kcl_eval::{AnswerGenerator, Evaluator, GenerationSettings, RagAnswerer};
//! use kcl_rag::{Dataset, RagConfig};
//!
//! let config = RagConfig::default();
//! let generator = AnswerGenerator::new(llm, GenerationSettings::from(&config));
//! let answerer = Arc::new(RagAnswerer::new(retriever, generator, &config));
//!
//! let dataset = Dataset::load("data/Criminal-Law-test.csv")?;
//! let report = Evaluator::new(answerer, config.concurrency)
//!     .evaluate_dataset(dataset, Some(20), "outputs/dev_eval.csv".as_ref())
//!     .await?;
//! println!("accuracy: {:.4}", report.accuracy);
//! ```

pub mod answerer;
pub mod baseline;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod parallel;
pub mod parser;
pub mod prompt;

pub use answerer::{QuestionAnswerer, RagAnswerer};
pub use baseline::{BaselineMode, majority_label, run_baseline};
pub use error::{EvalError, Result};
pub use evaluator::{
    ERROR_SENTINEL, EvaluationReport, Evaluator, PREDICTION_COLUMN, PredictionRecord,
};
pub use generator::{AnswerGenerator, GenerationSettings};
pub use parallel::ordered_parallel_map;
pub use parser::parse_answer;
pub use prompt::{SYSTEM_PROMPT, user_prompt};
