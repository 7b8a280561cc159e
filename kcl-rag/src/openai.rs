//! OpenAI embedding provider using the `/v1/embeddings` API.
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::DEFAULT_EMBEDDING_MODEL;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "OpenAI";

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible embeddings API.
///
/// Uses `reqwest` to call the `/embeddings` endpoint directly. Every call to
/// [`embed_batch`](EmbeddingProvider::embed_batch) is one HTTP request; there
/// is no retry.
///
/// # Example
///
/// ```rust,ignore
/// use kcl_rag::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::new("sk-...")?;
/// let vectors = provider.embed_batch(&["hello world"]).await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            base_url: OPENAI_API_BASE.into(),
        })
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the provider at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

// ── OpenAI API request/response types ──

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── EmbeddingProvider implementation ──

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest { model: &self.model, input: texts };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::EmbeddingError {
                    provider: PROVIDER.into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let mut data = embedding_response.data;
        // The API documents `index` as the input position; honor it when present.
        if data.iter().all(|d| d.index.is_some()) {
            data.sort_by_key(|d| d.index);
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        assert!(matches!(
            OpenAIEmbeddingProvider::new(""),
            Err(RagError::EmbeddingError { .. })
        ));
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let provider = OpenAIEmbeddingProvider::new("sk-test")
            .unwrap()
            .with_base_url("http://localhost:8080/v1/")
            .with_model("text-embedding-3-large");
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
        assert_eq!(provider.model(), "text-embedding-3-large");
    }

    #[tokio::test]
    async fn empty_batch_skips_request() {
        // Unroutable base URL: any request would fail.
        let provider =
            OpenAIEmbeddingProvider::new("sk-test").unwrap().with_base_url("http://127.0.0.1:1");
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }
}
