use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::time::Duration;
use tracing::debug;
use voca_core::{Result, VocaError};

use crate::provider::*;

/// OpenAI-compatible API client (works with OpenAI, Azure, vLLM proxies, etc.)
///
/// One instance serves both the chat and the image endpoint; both use the
/// same bearer key.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    provider_name: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".into(),
            provider_name: "openai".into(),
        }
    }

    /// Use a custom base URL (for Azure, local proxies, etc.)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Apply a per-request timeout. `0` keeps the transport default.
    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self> {
        if secs > 0 {
            self.client = reqwest::Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .map_err(|e| VocaError::Config(format!("failed to build HTTP client: {e}")))?;
        }
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Build the JSON body of a chat completion request.
pub fn chat_body(request: &ChatRequest) -> serde_json::Value {
    let mut messages = Vec::new();
    if let Some(ref system) = request.system {
        messages.push(serde_json::json!({ "role": "system", "content": system }));
    }
    messages.push(serde_json::json!({ "role": "user", "content": request.prompt }));

    let mut body = serde_json::json!({
        "model": &request.model,
        "messages": messages,
    });
    if let Some(t) = request.temperature {
        body["temperature"] = serde_json::json!(t);
    }
    if let Some(m) = request.max_tokens {
        body["max_tokens"] = serde_json::json!(m);
    }
    if request.json_response {
        body["response_format"] = serde_json::json!({ "type": "json_object" });
    }
    body
}

/// Build the JSON body of an image generation request.
pub fn image_body(request: &ImageRequest) -> serde_json::Value {
    serde_json::json!({
        "model": &request.model,
        "prompt": &request.prompt,
        "n": 1,
        "size": &request.size,
        "response_format": "b64_json",
    })
}

/// Turn a non-success image response into a classified error.
///
/// The code and message come from the `error` object when the body is JSON;
/// otherwise the raw body becomes the message and there is no code.
pub fn image_error_from_response(status: u16, body: &str) -> VocaError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().map(|v| &v["error"]);
    let code = error
        .and_then(|e| e["code"].as_str())
        .map(String::from);
    let message = error
        .and_then(|e| e["message"].as_str())
        .map(String::from)
        .unwrap_or_else(|| body.to_string());
    VocaError::ImageApi { status, code, message }
}

/// Extract and check the base64 payload of a successful image response.
pub fn image_payload(data: &serde_json::Value) -> Result<String> {
    let b64 = data["data"][0]["b64_json"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| VocaError::ImageProvider("response contains no b64_json payload".into()))?;
    BASE64
        .decode(b64)
        .map_err(|e| VocaError::ImageProvider(format!("b64_json payload is not valid base64: {e}")))?;
    Ok(b64.to_string())
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = chat_body(request);
        debug!(model = %request.model, json = request.json_response, "sending chat completion");

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VocaError::LlmProvider(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(VocaError::LlmProvider(format!("HTTP {status}: {text}")));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| VocaError::LlmProvider(e.to_string()))?;

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| VocaError::MalformedOutput("chat response has no message content".into()))
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn generate(&self, request: &ImageRequest) -> Result<String> {
        let body = image_body(request);
        debug!(model = %request.model, size = %request.size, "sending image generation");

        let resp = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VocaError::ImageProvider(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(image_error_from_response(status.as_u16(), &text));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| VocaError::ImageProvider(e.to_string()))?;
        image_payload(&data)
    }
}
