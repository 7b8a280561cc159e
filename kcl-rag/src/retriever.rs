//! Nearest-neighbor retrieval over the persisted question index.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::document::RetrievalHit;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::{IndexArtifacts, IndexPaths};

/// Retrieves the training documents most similar to a query.
///
/// The index artifacts are loaded from disk on first use and kept for the
/// lifetime of the retriever. Share one retriever (behind an `Arc`) across
/// all workers so the load happens once per process. A failed load is not
/// remembered: the next query tries again. A rebuilt index is only picked up
/// by a new retriever.
#[derive(Debug)]
pub struct Retriever {
    embedder: Embedder,
    paths: IndexPaths,
    artifacts: OnceCell<Arc<IndexArtifacts>>,
}

impl Retriever {
    /// Create a retriever reading artifacts from `paths`.
    pub fn new(embedder: Embedder, paths: IndexPaths) -> Self {
        Self { embedder, paths, artifacts: OnceCell::new() }
    }

    /// Create a retriever over artifacts already in memory.
    pub fn from_artifacts(
        embedder: Embedder,
        paths: IndexPaths,
        artifacts: IndexArtifacts,
    ) -> Self {
        Self { embedder, paths, artifacts: OnceCell::new_with(Some(Arc::new(artifacts))) }
    }

    /// Load the artifacts now instead of on the first query.
    ///
    /// Concurrent callers wait for a single load.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingIndex`] if an artifact file is absent, or
    /// [`RagError::IndexCardinalityMismatch`] if the files disagree.
    pub async fn load(&self) -> Result<Arc<IndexArtifacts>> {
        let artifacts = self
            .artifacts
            .get_or_try_init(|| async {
                let paths = self.paths.clone();
                let artifacts = tokio::task::spawn_blocking(move || IndexArtifacts::load(&paths))
                    .await
                    .map_err(|e| RagError::Io {
                        path: self.paths.texts.clone(),
                        source: std::io::Error::other(e),
                    })??;
                info!(documents = artifacts.len(), "index loaded");
                Ok::<_, RagError>(Arc::new(artifacts))
            })
            .await?;
        Ok(Arc::clone(artifacts))
    }

    /// Number of indexed documents, loading the index if needed.
    pub async fn document_count(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    /// Return up to `top_k` documents closest to `text`, most similar first.
    ///
    /// `top_k` is clamped to the number of indexed documents. A `top_k` of
    /// zero returns nothing and makes no embedding call.
    ///
    /// # Errors
    ///
    /// Propagates index loading and embedding failures.
    pub async fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievalHit>> {
        let artifacts = self.load().await?;
        let k = top_k.min(artifacts.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed_one(text).await?;
        let neighbors = artifacts.search.search(&query, k)?;

        let hits: Vec<RetrievalHit> = neighbors
            .into_iter()
            .filter_map(|n| {
                artifacts
                    .texts
                    .get(n.position)
                    .map(|text| RetrievalHit { text: text.clone(), distance: n.distance })
            })
            .collect();

        debug!(requested = top_k, returned = hits.len(), "retrieval completed");
        Ok(hits)
    }
}
