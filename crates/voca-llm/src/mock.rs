//! Mock providers for deterministic testing.
//!
//! Return pre-configured responses without making any HTTP calls, and record
//! every request so tests can assert on call counts and prompts.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::provider::*;
use voca_core::{Result, VocaError};

/// A mock chat provider that returns queued replies in order.
///
/// # Example
/// ```
/// use voca_llm::mock::MockChat;
/// let chat = MockChat::new().with_response(r#"{"ok":true}"#);
/// ```
#[derive(Clone, Default)]
pub struct MockChat {
    responses: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply.
    pub fn with_response(self, text: &str) -> Self {
        self.responses.lock().push_back(Ok(text.to_string()));
        self
    }

    /// Queue a failure, surfaced as [`VocaError::LlmProvider`].
    pub fn with_error(self, error: &str) -> Self {
        self.responses.lock().push_back(Err(error.to_string()));
        self
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ChatProvider for MockChat {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.requests.lock().push(request.clone());
        match self.responses.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(VocaError::LlmProvider(e)),
            None => Err(VocaError::LlmProvider("mock: no more queued responses".into())),
        }
    }
}

/// A pre-configured outcome of one image generation call.
#[derive(Debug, Clone)]
pub enum MockImage {
    /// A base64 payload.
    Success(String),
    /// A structured rejection with an HTTP status and optional error code.
    Rejected { status: u16, code: Option<String> },
    /// A transport-level failure.
    Transport(String),
}

impl MockImage {
    /// A 400 rejection with the given error code.
    pub fn rejected(code: &str) -> Self {
        MockImage::Rejected {
            status: 400,
            code: Some(code.to_string()),
        }
    }
}

/// A mock image provider that plays back queued outcomes in order.
/// Once the queue is empty every call fails with a transport error.
#[derive(Clone, Default)]
pub struct MockImages {
    outcomes: Arc<Mutex<VecDeque<MockImage>>>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl MockImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(self, outcome: MockImage) -> Self {
        self.outcomes.lock().push_back(outcome);
        self
    }

    /// Queue the same outcome `n` times.
    pub fn with_repeated(self, outcome: MockImage, n: usize) -> Self {
        {
            let mut outcomes = self.outcomes.lock();
            for _ in 0..n {
                outcomes.push_back(outcome.clone());
            }
        }
        self
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ImageProvider for MockImages {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &ImageRequest) -> Result<String> {
        self.requests.lock().push(request.clone());
        match self.outcomes.lock().pop_front() {
            Some(MockImage::Success(b64)) => Ok(b64),
            Some(MockImage::Rejected { status, code }) => Err(VocaError::ImageApi {
                status,
                message: format!("mock rejection ({})", code.as_deref().unwrap_or("no code")),
                code,
            }),
            Some(MockImage::Transport(e)) => Err(VocaError::ImageProvider(e)),
            None => Err(VocaError::ImageProvider("mock: no more queued outcomes".into())),
        }
    }
}
