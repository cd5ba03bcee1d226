//! # voca-config
//!
//! Configuration for the voca service. Reads `voca.toml`, then applies
//! environment overrides (`VOCA_*`), which win over the file. The API key is
//! the exception: a non-blank key in the file wins and `OPENAI_API_KEY` is
//! only the fallback.

pub mod schema;
pub mod loader;

pub use schema::VocaConfig;
pub use schema::{ConfigWarning, LoggingConfig, OpenAiConfig, RetryConfig, ServerConfig, StoreConfig, WarningSeverity};
pub use loader::ConfigLoader;
