//! Embedding providers and the normalizing embedding client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RagError, Result};

/// Added to every norm so zero vectors do not divide by zero.
pub const NORM_EPSILON: f32 = 1e-12;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. A single call to [`embed_batch`](EmbeddingProvider::embed_batch)
/// must result in a single request to the backend and return one vector per
/// input, in input order.
///
/// # Example
///
/// ```rust,ignore
/// use kcl_rag::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let vectors = provider.embed_batch(&["hello", "world"]).await?;
/// assert_eq!(vectors.len(), 2);
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// A short name for log and error messages.
    fn name(&self) -> &str;
}

/// A dense row-major `f32` matrix with one embedding per row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    dim: usize,
    rows: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Build a matrix from equally sized rows.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in &rows {
            if row.len() != dim {
                return Err(RagError::DimensionMismatch { expected: dim, actual: row.len() });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { dim, rows: rows.len(), data })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Width of each row.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row `i`, or `None` if out of range.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.rows {
            return None;
        }
        Some(&self.data[i * self.dim..(i + 1) * self.dim])
    }

    /// Iterate over rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim.max(1))
    }

    /// Whether the stored row count agrees with the data length.
    pub(crate) fn is_consistent(&self) -> bool {
        self.data.len() == self.rows * self.dim
    }
}

/// Scale `v` in place to unit Euclidean length.
///
/// The norm is accumulated in `f64` so long vectors stay within `1e-6` of unit length.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
        + f64::from(NORM_EPSILON);
    for x in v.iter_mut() {
        *x = (f64::from(*x) / norm) as f32;
    }
}

/// Embedding client that batches texts and returns L2-normalized vectors.
///
/// Normalized vectors make cosine similarity a plain dot product, which is
/// what the search index relies on.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl Embedder {
    /// Wrap a provider.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Embed `texts` in one provider call and normalize every row.
    ///
    /// An empty input returns an empty matrix without calling the provider.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the provider fails or returns a
    /// different number of vectors than texts, and
    /// [`RagError::DimensionMismatch`] if the vectors differ in length.
    pub async fn embed(&self, texts: &[&str]) -> Result<EmbeddingMatrix> {
        if texts.is_empty() {
            return Ok(EmbeddingMatrix::default());
        }

        debug!(provider = self.provider.name(), batch_size = texts.len(), "embedding batch");
        let mut vectors = self.provider.embed_batch(texts).await?;

        if vectors.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: self.provider.name().to_string(),
                message: format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
            });
        }

        for v in &mut vectors {
            l2_normalize(v);
        }
        EmbeddingMatrix::from_rows(vectors)
    }

    /// Embed a single text and return its normalized vector.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let matrix = self.embed(&[text]).await?;
        matrix.row(0).map(<[f32]>::to_vec).ok_or_else(|| RagError::EmbeddingError {
            provider: self.provider.name().to_string(),
            message: "provider returned no embedding".into(),
        })
    }
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder").field("provider", &self.provider.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0, -2.0]).collect())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn empty_input_makes_no_call() {
        let provider = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });
        let embedder = Embedder::new(provider.clone());

        let matrix = embedder.embed(&[]).await.unwrap();
        assert!(matrix.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn batch_is_one_call_and_keeps_order() {
        let provider = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });
        let embedder = Embedder::new(provider.clone());

        let matrix = embedder.embed(&["a", "abcd", "ab"]).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.dim(), 3);

        // First component grows with text length, so order is observable.
        let firsts: Vec<f32> = matrix.iter_rows().map(|r| r[0]).collect();
        assert!(firsts[0] < firsts[2] && firsts[2] < firsts[1]);
    }

    #[test]
    fn zero_vector_stays_finite() {
        let mut v = vec![0.0f32; 4];
        l2_normalize(&mut v);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = EmbeddingMatrix::from_rows(vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 1 }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn normalized_rows_have_unit_norm(
            v in proptest::collection::vec(-100.0f32..100.0f32, 1..64)
                .prop_filter("non-zero", |v| v.iter().any(|x| x.abs() > 1e-3))
        ) {
            let mut v = v;
            l2_normalize(&mut v);
            let norm = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();
            prop_assert!((norm - 1.0).abs() < 1e-6, "norm was {}", norm);
        }
    }
}
