//! Image generation with adaptive retry.
//!
//! The policy is a small state machine ([`RetryMachine`]) kept apart from the
//! network so it can be tested on its own:
//!
//! - attempts `1..=sanitize_after` send the description as-is; a retryable
//!   failure before attempt `sanitize_after` waits `backoff` first
//! - the attempt after `sanitize_after` rewrites the description once through
//!   the [`PromptSanitizer`], with no delay
//! - a retryable failure on the last attempt ends in
//!   [`VocaError::MaxRetriesExceeded`]
//! - any non-retryable failure aborts immediately

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use voca_config::RetryConfig;
use voca_core::{Result, VocaError};
use voca_llm::{ImageProvider, ImageRequest};

use crate::prompts::STYLE_SUFFIX;
use crate::sanitizer::PromptSanitizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub sanitize_after: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            sanitize_after: config.sanitize_after,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// What to do before sending an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPlan {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Rewrite the description before sending.
    pub sanitize: bool,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Try again, optionally after a delay.
    Retry { delay: Option<Duration> },
    /// Retryable failure, but no attempts remain.
    GiveUp,
    /// Not retryable.
    Abort,
}

/// Attempt counter plus a "has been sanitized" flag.
#[derive(Debug, Clone)]
pub struct RetryMachine {
    policy: RetryPolicy,
    attempt: u32,
    sanitized: bool,
}

impl RetryMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempt: 0,
            sanitized: false,
        }
    }

    /// Attempts started so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn sanitized(&self) -> bool {
        self.sanitized
    }

    /// Move to the next attempt, or `None` once the budget is spent.
    pub fn start_attempt(&mut self) -> Option<AttemptPlan> {
        if self.attempt >= self.policy.max_attempts {
            return None;
        }
        self.attempt += 1;
        let sanitize = !self.sanitized
            && self.policy.sanitize_after > 0
            && self.attempt == self.policy.sanitize_after + 1;
        if sanitize {
            self.sanitized = true;
        }
        Some(AttemptPlan {
            attempt: self.attempt,
            sanitize,
        })
    }

    /// Classify the failure of the current attempt.
    pub fn on_failure(&self, error: &VocaError) -> FailureAction {
        if !error.is_retryable_image_failure() {
            return FailureAction::Abort;
        }
        if self.attempt >= self.policy.max_attempts {
            return FailureAction::GiveUp;
        }
        let delay = (self.attempt < self.policy.sanitize_after && !self.policy.backoff.is_zero())
            .then_some(self.policy.backoff);
        FailureAction::Retry { delay }
    }
}

/// Drives the image provider through a [`RetryMachine`].
#[derive(Clone)]
pub struct ImageGenerator {
    images: Arc<dyn ImageProvider>,
    sanitizer: PromptSanitizer,
    policy: RetryPolicy,
    model: String,
    size: String,
}

impl ImageGenerator {
    pub fn new(
        images: Arc<dyn ImageProvider>,
        sanitizer: PromptSanitizer,
        policy: RetryPolicy,
        model: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            images,
            sanitizer,
            policy,
            model: model.into(),
            size: size.into(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate an image for `base_description` and return its base64 payload.
    pub async fn generate_image(&self, base_description: &str) -> Result<String> {
        let mut machine = RetryMachine::new(self.policy.clone());
        let mut description = base_description.to_string();

        while let Some(plan) = machine.start_attempt() {
            if plan.sanitize {
                description = self.sanitizer.rewrite_or_fallback(&description).await;
            }

            let request = ImageRequest {
                model: self.model.clone(),
                prompt: format!("{description}{STYLE_SUFFIX}"),
                size: self.size.clone(),
            };

            let error = match self.images.generate(&request).await {
                Ok(b64) => {
                    info!(attempt = plan.attempt, sanitized = machine.sanitized(), "image generated");
                    return Ok(b64);
                }
                Err(e) => e,
            };

            match machine.on_failure(&error) {
                FailureAction::Retry { delay } => {
                    warn!(
                        attempt = plan.attempt,
                        code = error.image_error_code().unwrap_or("none"),
                        "image attempt rejected, retrying"
                    );
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                }
                FailureAction::GiveUp => {
                    warn!(attempts = plan.attempt, "image generation exhausted its attempts");
                    return Err(VocaError::MaxRetriesExceeded {
                        attempts: plan.attempt,
                        code: error.image_error_code().unwrap_or("unknown").to_string(),
                    });
                }
                FailureAction::Abort => {
                    warn!(attempt = plan.attempt, error = %error, "image generation failed");
                    return Err(error);
                }
            }
        }

        Err(VocaError::ImageProvider("retry policy allows no attempts".into()))
    }
}
