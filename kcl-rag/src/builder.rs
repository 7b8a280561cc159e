//! Offline index construction from a labeled training table.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::dataset::Dataset;
use crate::document::QuestionRecord;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::{FlatIndex, IndexArtifacts, IndexPaths};

/// Default neighbor count stored in a fitted index.
pub const DEFAULT_BUILD_NEIGHBORS: usize = 10;

/// What an index build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBuildOutcome {
    /// Artifacts were written.
    Built {
        /// Number of indexed documents.
        documents: usize,
        /// Embedding dimensionality.
        dim: usize,
    },
    /// Nothing was indexed because there was no training data.
    NoTrainingData {
        /// Why no data was found.
        reason: String,
    },
}

/// Builds the question index: documents → embeddings → fitted search structure → disk.
///
/// Rebuilding overwrites the previous artifacts. Two builders must not write
/// to the same [`IndexPaths`] at the same time.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    embedder: Embedder,
    paths: IndexPaths,
    neighbors: usize,
}

impl IndexBuilder {
    /// Create a builder writing to `paths`.
    pub fn new(embedder: Embedder, paths: IndexPaths) -> Self {
        Self { embedder, paths, neighbors: DEFAULT_BUILD_NEIGHBORS }
    }

    /// Set the neighbor count stored in the fitted index.
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// Where the artifacts are written.
    pub fn paths(&self) -> &IndexPaths {
        &self.paths
    }

    /// Build from the first existing file among `candidates`.
    ///
    /// A missing or empty training table is reported as
    /// [`IndexBuildOutcome::NoTrainingData`] rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is malformed, embedding fails, or the
    /// artifacts cannot be written.
    pub async fn build_from_files(&self, candidates: &[PathBuf]) -> Result<IndexBuildOutcome> {
        let Some(path) = candidates.iter().find(|p| p.exists()) else {
            let searched: Vec<String> =
                candidates.iter().map(|p| p.display().to_string()).collect();
            let reason = format!("training data not found (searched: {})", searched.join(", "));
            error!(%reason, "cannot build index");
            return Ok(IndexBuildOutcome::NoTrainingData { reason });
        };

        info!(path = %path.display(), "loading knowledge base");
        let dataset = Dataset::load(path)?;
        self.build_from_records(dataset.records(), path).await
    }

    /// Build from records already in memory.
    ///
    /// `source` is only used in log messages.
    pub async fn build_from_records(
        &self,
        records: &[QuestionRecord],
        source: &Path,
    ) -> Result<IndexBuildOutcome> {
        if records.is_empty() {
            let reason = format!("training data is empty: {}", source.display());
            error!(%reason, "cannot build index");
            return Ok(IndexBuildOutcome::NoTrainingData { reason });
        }

        let texts: Vec<String> = records.iter().map(QuestionRecord::document_text).collect();
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();

        info!(documents = texts.len(), "embedding documents");
        let embeddings = self.embedder.embed(&inputs).await?;

        if self.neighbors > embeddings.rows() {
            warn!(
                requested = self.neighbors,
                documents = embeddings.rows(),
                "neighbor count exceeds corpus size, clamping"
            );
        }
        let search = FlatIndex::fit(embeddings.clone(), self.neighbors);
        let dim = embeddings.dim();

        let artifacts = IndexArtifacts { texts, embeddings, search };
        artifacts.validate()?;
        artifacts.save(&self.paths)?;

        info!(documents = artifacts.len(), dim, "index built");
        Ok(IndexBuildOutcome::Built { documents: artifacts.len(), dim })
    }
}
