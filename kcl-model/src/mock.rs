//! Mock completion model for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::llm::{CompletionModel, CompletionRequest};

type Responder = Arc<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>;

/// A [`CompletionModel`] that answers from a script and records every request.
///
/// Queued responses are returned first, in order. Once the queue is empty the
/// responder (if any) is called, otherwise the call fails with
/// [`ModelError::EmptyResponse`].
///
/// # Example
///
/// ```rust,ignore
/// use kcl_model::{CompletionModel, CompletionRequest, MockLlm};
///
/// let llm = MockLlm::new("mock").with_response("정답: B");
/// let text = llm.complete(CompletionRequest::new("m", "sys", "user")).await?;
/// assert_eq!(text, "정답: B");
/// assert_eq!(llm.requests().len(), 1);
/// ```
#[derive(Clone)]
pub struct MockLlm {
    name: String,
    queued: Arc<Mutex<VecDeque<Result<String>>>>,
    responder: Option<Responder>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlm {
    /// Create a mock with no scripted responses.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queued: Arc::default(),
            responder: None,
            requests: Arc::default(),
        }
    }

    /// Queue a successful response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failed call.
    pub fn with_error(self, error: ModelError) -> Self {
        self.push(Err(error));
        self
    }

    /// Compute responses from the request once the queue is drained.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// All requests received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn push(&self, response: Result<String>) {
        if let Ok(mut queued) = self.queued.lock() {
            queued.push_back(response);
        }
    }
}

impl std::fmt::Debug for MockLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlm").field("name", &self.name).finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionModel for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let queued = self.queued.lock().ok().and_then(|mut q| q.pop_front());
        match (queued, &self.responder) {
            (Some(response), _) => response,
            (None, Some(responder)) => responder(&request),
            (None, None) => Err(ModelError::EmptyResponse { provider: self.name.clone() }),
        }
    }
}
