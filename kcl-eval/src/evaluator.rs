//! Concurrent evaluation of a question table against gold labels.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kcl_rag::{AnswerLetter, Dataset, QuestionRecord};
use serde::Serialize;
use tracing::{info, warn};

use crate::answerer::QuestionAnswerer;
use crate::error::Result;
use crate::parallel::ordered_parallel_map;
use crate::parser::parse_answer;

/// Prediction shown for rows that produced no answer letter.
pub const ERROR_SENTINEL: &str = "Error";

/// Name of the appended output column.
pub const PREDICTION_COLUMN: &str = "pred";

/// The outcome for one evaluated row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    /// Position of the row in the input table.
    pub index: usize,
    /// Full model output, empty if the model was never reached or failed.
    pub raw_output: String,
    /// Parsed answer, `None` on any failure.
    pub predicted: Option<AnswerLetter>,
    /// Normalized gold answer, `None` if the label was invalid.
    pub gold: Option<AnswerLetter>,
    /// Why no answer was produced.
    pub error: Option<String>,
}

impl PredictionRecord {
    /// Whether the parsed answer matches the gold answer.
    pub fn is_correct(&self) -> bool {
        matches!((self.predicted, self.gold), (Some(p), Some(g)) if p == g)
    }

    /// The answer letter, or [`ERROR_SENTINEL`].
    pub fn prediction_label(&self) -> &'static str {
        self.predicted.map_or(ERROR_SENTINEL, AnswerLetter::as_str)
    }
}

/// Aggregate result of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Number of evaluated rows.
    pub total: usize,
    /// Rows whose prediction matched the gold answer.
    pub correct: usize,
    /// Rows that ended with the error sentinel.
    pub failed: usize,
    /// `correct / total` (0 for an empty run).
    pub accuracy: f64,
    /// One record per row, in input order.
    pub predictions: Vec<PredictionRecord>,
}

impl EvaluationReport {
    /// Summarize predictions already in input order.
    pub fn from_predictions(predictions: Vec<PredictionRecord>) -> Self {
        let total = predictions.len();
        let correct = predictions.iter().filter(|p| p.is_correct()).count();
        let failed = predictions.iter().filter(|p| p.predicted.is_none()).count();
        let accuracy = correct as f64 / total.max(1) as f64;
        Self { total, correct, failed, accuracy, predictions }
    }

    /// Raw model outputs in row order, for the output table.
    pub fn raw_outputs(&self) -> Vec<String> {
        self.predictions.iter().map(|p| p.raw_output.clone()).collect()
    }
}

/// Runs an answerer over every row of a table with bounded concurrency.
///
/// A failing row (invalid gold label, service error, unparseable output)
/// is recorded with the error sentinel; it never aborts the batch.
#[derive(Clone)]
pub struct Evaluator {
    answerer: Arc<dyn QuestionAnswerer>,
    concurrency: usize,
}

impl Evaluator {
    /// Create an evaluator running up to `concurrency` rows at once.
    pub fn new(answerer: Arc<dyn QuestionAnswerer>, concurrency: usize) -> Self {
        Self { answerer, concurrency: concurrency.max(1) }
    }

    /// Evaluate `records` and return one prediction per record, in order.
    pub async fn evaluate(&self, records: &[QuestionRecord]) -> EvaluationReport {
        let total = records.len();
        let done = AtomicUsize::new(0);
        info!(rows = total, concurrency = self.concurrency, "evaluation started");

        let rows: Vec<&QuestionRecord> = records.iter().collect();
        let predictions = ordered_parallel_map(rows, self.concurrency, |index, record| {
            let done = &done;
            async move {
                let prediction = evaluate_row(self.answerer.as_ref(), index, record).await;
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if finished % 10 == 0 || finished == total {
                    info!(finished, total, "evaluation progress");
                }
                prediction
            }
        })
        .await;

        let report = EvaluationReport::from_predictions(predictions);
        info!(
            accuracy = report.accuracy,
            correct = report.correct,
            total = report.total,
            failed = report.failed,
            "evaluation finished"
        );
        report
    }

    /// Evaluate a dataset, optionally limited to its first `subset` rows
    /// (zero means all), and write the table with a [`PREDICTION_COLUMN`]
    /// of raw outputs to `output`.
    ///
    /// # Errors
    ///
    /// Only writing the output table can fail; row failures are recorded in
    /// the report.
    pub async fn evaluate_dataset(
        &self,
        dataset: Dataset,
        subset: Option<usize>,
        output: &Path,
    ) -> Result<EvaluationReport> {
        let dataset = match subset {
            Some(n) if n > 0 => dataset.head(n),
            _ => dataset,
        };
        let report = self.evaluate(dataset.records()).await;
        dataset.write_with_column(output, PREDICTION_COLUMN, &report.raw_outputs())?;
        info!(path = %output.display(), "saved predictions");
        Ok(report)
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator").field("concurrency", &self.concurrency).finish_non_exhaustive()
    }
}

async fn evaluate_row(
    answerer: &dyn QuestionAnswerer,
    index: usize,
    record: &QuestionRecord,
) -> PredictionRecord {
    let gold = match record.gold() {
        Ok(gold) => gold,
        Err(e) => {
            warn!(row = index, error = %e, "invalid gold label");
            return PredictionRecord {
                index,
                raw_output: String::new(),
                predicted: None,
                gold: None,
                error: Some(e.to_string()),
            };
        }
    };

    let raw_output = match answerer.answer(&record.question_block()).await {
        Ok(text) => text,
        Err(e) => {
            warn!(row = index, error = %e, "answering failed");
            return PredictionRecord {
                index,
                raw_output: String::new(),
                predicted: None,
                gold: Some(gold),
                error: Some(e.to_string()),
            };
        }
    };

    match parse_answer(&raw_output) {
        Ok(letter) => {
            PredictionRecord {
                index,
                raw_output,
                predicted: Some(letter),
                gold: Some(gold),
                error: None,
            }
        }
        Err(e) => {
            warn!(row = index, "could not parse answer");
            PredictionRecord {
                index,
                raw_output,
                predicted: None,
                gold: Some(gold),
                error: Some(e.to_string()),
            }
        }
    }
}
