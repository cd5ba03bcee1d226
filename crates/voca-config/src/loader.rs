use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::schema::VocaConfig;

/// Loads the voca configuration from disk and the environment.
pub struct ConfigLoader {
    config: VocaConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > VOCA_CONFIG env > ~/.voca/voca.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("VOCA_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".voca")
            .join("voca.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> voca_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            Self::parse(&raw).map_err(|e| {
                voca_core::VocaError::Config(format!("failed to parse {}: {}", config_path.display(), e))
            })?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            VocaConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(voca_core::VocaError::Config(e));
            }
        }

        Ok(Self { config, config_path })
    }

    /// Parse a TOML document into a config, applying section defaults.
    pub fn parse(raw: &str) -> Result<VocaConfig, toml::de::Error> {
        toml::from_str::<VocaConfig>(raw)
    }

    /// Get a copy of the loaded config.
    pub fn get(&self) -> VocaConfig {
        self.config.clone()
    }

    /// Path the config was resolved from (it may not exist).
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (VOCA_CHAT_MODEL, VOCA_DB_PATH, etc.)
    pub fn apply_env_overrides(mut config: VocaConfig) -> VocaConfig {
        if let Ok(v) = std::env::var("VOCA_CHAT_MODEL") {
            config.openai.chat_model = v;
        }
        if let Ok(v) = std::env::var("VOCA_IMAGE_MODEL") {
            config.openai.image_model = v;
        }
        if let Ok(v) = std::env::var("VOCA_SERVER_LISTEN") {
            config.server.listen = v;
        }
        if let Ok(v) = std::env::var("VOCA_DB_PATH") {
            config.store.path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("VOCA_LOG_LEVEL") {
            config.logging.level = v;
        }
        // API key: env var fills in when the config file has none (or a blank one).
        if config
            .openai
            .api_key
            .as_deref()
            .is_none_or(|k| k.trim().is_empty())
        {
            if let Ok(v) = std::env::var("OPENAI_API_KEY") {
                config.openai.api_key = Some(v);
            }
        }
        config
    }
}
