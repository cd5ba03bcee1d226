use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, mapped from `voca.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocaConfig {
    pub openai: OpenAiConfig,
    pub retry: RetryConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

// ── OpenAI ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key used for both the chat and the image endpoint.
    /// Can also be set via OPENAI_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Model used to invent skills and to rewrite rejected image prompts.
    pub chat_model: String,
    /// Model used to render skill images.
    pub image_model: String,
    /// Model used by the translation practice endpoints.
    pub translation_model: String,
    /// Requested image size, e.g. "1024x1024".
    pub image_size: String,
    /// Per-request timeout in seconds. 0 = transport default (no timeout).
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            chat_model: "gpt-3.5-turbo".into(),
            image_model: "dall-e-3".into(),
            translation_model: "gpt-4o-mini".into(),
            image_size: "1024x1024".into(),
            request_timeout_secs: 0,
        }
    }
}

// ── Retry ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total image generation attempts per skill.
    pub max_attempts: u32,
    /// Number of failed attempts before the prompt is rewritten.
    pub sanitize_after: u32,
    /// Delay between early attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            sanitize_after: 3,
            backoff_ms: 2000,
        }
    }
}

// ── Store ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".voca")
                .join("voca.db"),
        }
    }
}

// ── Server ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address.
    pub listen: String,
    /// Enable permissive CORS (for browser front-ends on another origin).
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".into(),
            cors: false,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl VocaConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all messages joined if any severity is Error.
    ///
    /// A missing API key is not checked here; see [`VocaConfig::require_api_key`].
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Models ───
        for (field, value) in [
            ("openai.chat_model", &self.openai.chat_model),
            ("openai.image_model", &self.openai.image_model),
            ("openai.translation_model", &self.openai.translation_model),
        ] {
            if value.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: field.into(),
                    message: "model is empty".into(),
                    severity: WarningSeverity::Error,
                    hint: Some("Set to e.g. 'gpt-4o-mini' or 'dall-e-3'".into()),
                });
            }
        }

        // ── Base URL ───
        if !self.openai.base_url.starts_with("http://") && !self.openai.base_url.starts_with("https://") {
            warnings.push(ConfigWarning {
                field: "openai.base_url".into(),
                message: format!("'{}' is not an http(s) URL", self.openai.base_url),
                severity: WarningSeverity::Error,
                hint: Some("Use 'https://api.openai.com/v1' or a compatible endpoint".into()),
            });
        }

        // ── Retry policy ───
        if self.retry.max_attempts == 0 {
            warnings.push(ConfigWarning {
                field: "retry.max_attempts".into(),
                message: "max_attempts is 0, so no image would ever be requested".into(),
                severity: WarningSeverity::Error,
                hint: Some("The default is 5".into()),
            });
        } else if self.retry.sanitize_after >= self.retry.max_attempts {
            warnings.push(ConfigWarning {
                field: "retry.sanitize_after".into(),
                message: format!(
                    "sanitize_after ({}) >= max_attempts ({}); prompts will never be rewritten",
                    self.retry.sanitize_after, self.retry.max_attempts
                ),
                severity: WarningSeverity::Warning,
                hint: Some("The default is 3 of 5".into()),
            });
        }

        // ── Server listen address ───
        if self.server.listen.is_empty() {
            warnings.push(ConfigWarning {
                field: "server.listen".into(),
                message: "listen address is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. '127.0.0.1:8080'".into()),
            });
        }

        // ── Logging ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }

    /// The configured API key, or a validation error when it is absent or blank.
    /// Commands that talk to the upstream API call this before building clients.
    pub fn require_api_key(&self) -> voca_core::Result<&str> {
        match self.openai.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(voca_core::VocaError::ConfigValidation {
                field: "openai.api_key".into(),
                reason: "not set (use [openai] api_key in voca.toml or OPENAI_API_KEY)".into(),
            }),
        }
    }
}
