//! CSV datasets of multiple-choice questions.
//!
//! A [`Dataset`] keeps the raw rows alongside the typed [`QuestionRecord`]s so
//! that output tables can reproduce every input column, including ones this
//! crate does not interpret.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::debug;

use crate::document::QuestionRecord;
use crate::error::{RagError, Result};

/// Columns every dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = ["question", "A", "B", "C", "D", "answer"];

/// A loaded question table.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    headers: StringRecord,
    rows: Vec<StringRecord>,
    records: Vec<QuestionRecord>,
}

impl Dataset {
    /// Load a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DatasetError`] if the file cannot be read, a row is
    /// malformed, or any of [`REQUIRED_COLUMNS`] is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dataset_error =
            |message: String| RagError::DatasetError { path: path.clone(), message };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .map_err(|e| dataset_error(format!("failed to open: {e}")))?;

        let headers = reader
            .headers()
            .map_err(|e| dataset_error(format!("failed to read header: {e}")))?
            .clone();

        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| dataset_error(format!("missing required column '{column}'")))?;
        }

        let mut rows = Vec::new();
        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row.map_err(|e| dataset_error(format!("row {}: {e}", line + 1)))?;
            let cell = |i: usize| row.get(positions[i]).unwrap_or_default().to_string();
            records.push(QuestionRecord {
                question: cell(0),
                a: cell(1),
                b: cell(2),
                c: cell(3),
                d: cell(4),
                answer: cell(5),
            });
            rows.push(row);
        }

        debug!(path = %path.display(), rows = records.len(), "loaded dataset");
        Ok(Self { path, headers, rows, records })
    }

    /// The file this dataset was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The typed question records in row order.
    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only the first `n` rows.
    pub fn head(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self.records.truncate(n);
        self
    }

    /// Write the table with one extra column appended.
    ///
    /// `values[i]` becomes the new cell of row `i`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DatasetError`] if `values` does not have one entry
    /// per row or the file cannot be written.
    pub fn write_with_column(
        &self,
        path: impl AsRef<Path>,
        column: &str,
        values: &[String],
    ) -> Result<()> {
        let path = path.as_ref();
        let dataset_error =
            |message: String| RagError::DatasetError { path: path.to_path_buf(), message };

        if values.len() != self.rows.len() {
            return Err(dataset_error(format!(
                "expected {} values for column '{column}', got {}",
                self.rows.len(),
                values.len()
            )));
        }

        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| dataset_error(format!("failed to create: {e}")))?;

        let mut header = self.headers.clone();
        header.push_field(column);
        writer.write_record(&header).map_err(|e| dataset_error(format!("write header: {e}")))?;

        for (row, value) in self.rows.iter().zip(values) {
            let mut out = row.clone();
            out.push_field(value);
            writer.write_record(&out).map_err(|e| dataset_error(format!("write row: {e}")))?;
        }

        writer.flush().map_err(|source| RagError::Io { path: path.to_path_buf(), source })?;
        debug!(path = %path.display(), rows = values.len(), column, "wrote dataset");
        Ok(())
    }
}
