use thiserror::Error;

/// Error codes from the image API that are worth retrying.
pub const RETRYABLE_IMAGE_CODES: &[&str] = &["content_policy_violation", "invalid_request_error"];

/// Unified error type for the voca workspace.
#[derive(Error, Debug)]
pub enum VocaError {
    // ── Upstream chat API ──────────────────────────────────────
    #[error("chat API error: {0}")]
    LlmProvider(String),

    // ── Upstream image API ─────────────────────────────────────
    #[error("image API error: HTTP {status} (code={}): {message}", .code.as_deref().unwrap_or("none"))]
    ImageApi {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("image API error: {0}")]
    ImageProvider(String),

    #[error("image generation failed after {attempts} attempts (code={code})")]
    MaxRetriesExceeded { attempts: u32, code: String },

    // ── Model output ───────────────────────────────────────────
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    // ── Store ──────────────────────────────────────────────────
    #[error("skill already exists for word '{word}'")]
    SkillConflict { word: String },

    #[error("store error: {0}")]
    Store(String),

    // ── Config ─────────────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Request validation ─────────────────────────────────────
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl VocaError {
    /// A 400 from the image API carrying a policy or validation code.
    /// Anything else (other statuses, transport errors, missing payloads)
    /// cannot be fixed by sending the request again.
    pub fn is_retryable_image_failure(&self) -> bool {
        match self {
            VocaError::ImageApi {
                status: 400,
                code: Some(code),
                ..
            } => RETRYABLE_IMAGE_CODES.contains(&code.as_str()),
            _ => false,
        }
    }

    /// The structured error code of an image API failure, if any.
    pub fn image_error_code(&self) -> Option<&str> {
        match self {
            VocaError::ImageApi { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VocaError>;
