use std::sync::Arc;
use tracing::{info, warn};
use voca_core::{Result, VocaError};
use voca_llm::{ChatProvider, ChatRequest};

use crate::prompts;

/// Rewrites image descriptions that the image model keeps rejecting.
#[derive(Clone)]
pub struct PromptSanitizer {
    chat: Arc<dyn ChatProvider>,
    model: String,
}

/// Trim, then drop one leading and one trailing double quote.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix('"').unwrap_or(text);
    text.strip_suffix('"').unwrap_or(text)
}

impl PromptSanitizer {
    pub fn new(chat: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    /// Ask the chat model for a policy-safe rewrite of `description`.
    pub async fn rewrite(&self, description: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model, prompts::sanitize_user_prompt(description))
            .with_system(prompts::SANITIZE_SYSTEM);
        let reply = self.chat.complete(&request).await?;
        let rewritten = strip_quotes(&reply);
        if rewritten.trim().is_empty() {
            return Err(VocaError::MalformedOutput("prompt rewrite was empty".into()));
        }
        Ok(rewritten.to_string())
    }

    /// [`rewrite`](Self::rewrite), falling back to the original description
    /// with a fixed suffix. Never fails.
    pub async fn rewrite_or_fallback(&self, description: &str) -> String {
        match self.rewrite(description).await {
            Ok(rewritten) => {
                info!(original = %description, rewritten = %rewritten, "image prompt rewritten");
                rewritten
            }
            Err(e) => {
                warn!(error = %e, "prompt rewrite failed, using fallback suffix");
                format!("{description}{}", prompts::SAFE_FALLBACK_SUFFIX)
            }
        }
    }
}
