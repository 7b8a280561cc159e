//! Flat nearest-neighbor index and the persisted index artifacts.
//!
//! The index is a brute-force scan: the corpus is a few thousand exam
//! questions, so an exact search over every vector is cheap and avoids the
//! recall loss of an approximate structure.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::EmbeddingMatrix;
use crate::error::{RagError, Result};

/// Distance metric used by [`FlatIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// `1 - cos(a, b)`.
    Cosine,
}

/// A fitted exact k-nearest-neighbor structure over a set of vectors.
///
/// Neighbor positions returned by [`search`](FlatIndex::search) are row
/// numbers of the fitted matrix, i.e. document IDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    metric: Metric,
    /// Default number of neighbors, bounded by the corpus size at fit time.
    neighbors: usize,
    vectors: EmbeddingMatrix,
}

/// A neighbor position and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row of the fitted matrix.
    pub position: usize,
    /// Cosine distance to the query.
    pub distance: f32,
}

impl FlatIndex {
    /// Fit the index over `vectors` with a cosine metric.
    ///
    /// `neighbors` is clamped to the number of vectors.
    pub fn fit(vectors: EmbeddingMatrix, neighbors: usize) -> Self {
        let neighbors = neighbors.min(vectors.rows());
        Self { metric: Metric::Cosine, neighbors, vectors }
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.vectors.rows()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimensionality of the indexed vectors.
    pub fn dim(&self) -> usize {
        self.vectors.dim()
    }

    /// The default neighbor count chosen at fit time.
    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    /// The metric this index was fitted with.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Return the `k` nearest vectors, closest first.
    ///
    /// `k` is clamped to the number of indexed vectors. Ties keep the lower
    /// position first so results are deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if `query` has a different
    /// length than the indexed vectors.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dim() {
            return Err(RagError::DimensionMismatch { expected: self.dim(), actual: query.len() });
        }

        let mut scored: Vec<Neighbor> = self
            .vectors
            .iter_rows()
            .enumerate()
            .map(|(position, row)| Neighbor { position, distance: cosine_distance(row, query) })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        scored.truncate(k.min(self.len()));
        Ok(scored)
    }
}

/// Compute cosine distance between two vectors.
///
/// Returns 1.0 (orthogonal) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// File locations of the three index artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    /// Ordered document texts (`texts.json`).
    pub texts: PathBuf,
    /// Embedding matrix (`embeddings.json`).
    pub embeddings: PathBuf,
    /// Fitted search structure (`nn.json`).
    pub search: PathBuf,
}

impl IndexPaths {
    /// Standard artifact names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            texts: dir.join("texts.json"),
            embeddings: dir.join("embeddings.json"),
            search: dir.join("nn.json"),
        }
    }

    fn all(&self) -> [&Path; 3] {
        [&self.texts, &self.embeddings, &self.search]
    }
}

/// The persisted index: document texts, their embeddings, and the fitted search structure.
///
/// Position `i` in `texts` corresponds to row `i` of `embeddings` and to
/// neighbor position `i` returned by `search`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexArtifacts {
    /// Document texts in ID order.
    pub texts: Vec<String>,
    /// Normalized embeddings, one row per document.
    pub embeddings: EmbeddingMatrix,
    /// Search structure fitted on `embeddings`.
    pub search: FlatIndex,
}

impl IndexArtifacts {
    /// Number of documents.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the index has no documents.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Fail unless all three artifacts describe the same documents.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexCardinalityMismatch`] on any disagreement.
    pub fn validate(&self) -> Result<()> {
        let texts = self.texts.len();
        let embeddings = self.embeddings.rows();
        let indexed = self.search.len();
        let consistent = self.embeddings.is_consistent() && self.search.vectors.is_consistent();
        if texts != embeddings || texts != indexed || !consistent {
            return Err(RagError::IndexCardinalityMismatch { texts, embeddings, indexed });
        }
        if self.embeddings.dim() != self.search.dim() {
            return Err(RagError::DimensionMismatch {
                expected: self.search.dim(),
                actual: self.embeddings.dim(),
            });
        }
        Ok(())
    }

    /// Write all three artifacts, creating the parent directories.
    ///
    /// Existing files are overwritten.
    pub fn save(&self, paths: &IndexPaths) -> Result<()> {
        for path in paths.all() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|source| RagError::Io { path: parent.to_path_buf(), source })?;
            }
        }
        write_json(&paths.texts, &self.texts)?;
        write_json(&paths.embeddings, &self.embeddings)?;
        write_json(&paths.search, &self.search)?;
        info!(documents = self.len(), dim = self.embeddings.dim(), "saved index artifacts");
        Ok(())
    }

    /// Read and validate all three artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingIndex`] naming the first absent file, or
    /// [`RagError::IndexCardinalityMismatch`] if the files disagree.
    pub fn load(paths: &IndexPaths) -> Result<Self> {
        for path in paths.all() {
            if !path.exists() {
                return Err(RagError::MissingIndex { path: path.to_path_buf() });
            }
        }
        let artifacts = Self {
            texts: read_json(&paths.texts)?,
            embeddings: read_json(&paths.embeddings)?,
            search: read_json(&paths.search)?,
        };
        artifacts.validate()?;
        debug!(documents = artifacts.len(), "loaded index artifacts");
        Ok(artifacts)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)
        .map_err(|source| RagError::Serialization { path: path.to_path_buf(), source })?;
    fs::write(path, bytes).map_err(|source| RagError::Io { path: path.to_path_buf(), source })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|source| RagError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes)
        .map_err(|source| RagError::Serialization { path: path.to_path_buf(), source })
}
