use async_trait::async_trait;
use voca_core::Result;

/// A single-turn chat completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The model to use, e.g. "gpt-4o-mini".
    pub model: String,
    /// Optional system instruction, sent before the user message.
    pub system: Option<String>,
    /// The user message.
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the API to constrain the reply to a JSON object.
    pub json_response: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
            json_response: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// An image generation request. Images are always requested inline as base64.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    /// e.g. "1024x1024"
    pub size: String,
}

/// A chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Human-readable name, e.g. "openai".
    fn name(&self) -> &str;

    /// Send the request and return the raw text content of the first choice.
    /// Non-success statuses surface as [`voca_core::VocaError::LlmProvider`].
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// An image-generation backend.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Generate one image and return its base64 payload.
    ///
    /// Structured API rejections surface as [`voca_core::VocaError::ImageApi`]
    /// so callers can classify them; transport problems and malformed
    /// successes as [`voca_core::VocaError::ImageProvider`].
    async fn generate(&self, request: &ImageRequest) -> Result<String>;
}
