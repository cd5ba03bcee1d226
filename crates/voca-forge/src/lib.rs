//! # voca-forge
//!
//! The workflows behind the voca API:
//!
//! - [`SkillForge`] turns a word and its meaning into a stored game skill,
//!   rendering its image through the retrying [`ImageGenerator`].
//! - [`TranslationService`] creates translation questions and scores answers.
//!
//! [`Forge`] wires both from a [`voca_config::VocaConfig`].

pub mod parse;
pub mod prompts;
pub mod retry;
pub mod sanitizer;
pub mod skill;
pub mod translation;

use std::sync::Arc;
use voca_config::VocaConfig;
use voca_llm::{ChatProvider, ImageProvider, OpenAiProvider};
use voca_store::SkillStore;

pub use retry::{AttemptPlan, FailureAction, ImageGenerator, RetryMachine, RetryPolicy};
pub use sanitizer::PromptSanitizer;
pub use skill::SkillForge;
pub use translation::{
    CreateQuestionRequest, CreateQuestionResponse, EvaluateRequest, EvaluateResponse, TranslationService,
};

/// Model names and retry policy used by the workflows.
#[derive(Debug, Clone)]
pub struct ForgeSettings {
    pub chat_model: String,
    pub image_model: String,
    pub translation_model: String,
    pub image_size: String,
    pub retry: RetryPolicy,
}

impl ForgeSettings {
    pub fn from_config(config: &VocaConfig) -> Self {
        Self {
            chat_model: config.openai.chat_model.clone(),
            image_model: config.openai.image_model.clone(),
            translation_model: config.openai.translation_model.clone(),
            image_size: config.openai.image_size.clone(),
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

impl Default for ForgeSettings {
    fn default() -> Self {
        Self::from_config(&VocaConfig::default())
    }
}

/// Both workflows, sharing one chat backend.
#[derive(Clone)]
pub struct Forge {
    pub skills: SkillForge,
    pub translation: TranslationService,
}

impl Forge {
    /// Wire the workflows around explicit backends (mocks in tests).
    pub fn with_providers(
        chat: Arc<dyn ChatProvider>,
        images: Arc<dyn ImageProvider>,
        store: SkillStore,
        settings: ForgeSettings,
    ) -> Self {
        let sanitizer = PromptSanitizer::new(Arc::clone(&chat), &settings.chat_model);
        let generator = ImageGenerator::new(
            images,
            sanitizer,
            settings.retry.clone(),
            &settings.image_model,
            &settings.image_size,
        );
        Self {
            skills: SkillForge::new(Arc::clone(&chat), &settings.chat_model, store, generator),
            translation: TranslationService::new(chat, &settings.translation_model),
        }
    }

    /// Wire the workflows against the configured OpenAI-compatible API.
    /// Fails when no API key is configured.
    pub fn from_config(config: &VocaConfig, store: SkillStore) -> voca_core::Result<Self> {
        let provider = openai_provider(config)?;
        Ok(Self::with_providers(
            provider.clone(),
            provider,
            store,
            ForgeSettings::from_config(config),
        ))
    }
}

/// The OpenAI client described by `config`, shared by chat and image calls.
pub fn openai_provider(config: &VocaConfig) -> voca_core::Result<Arc<OpenAiProvider>> {
    let api_key = config.require_api_key()?;
    let provider = OpenAiProvider::new(api_key.to_string())
        .with_base_url(&config.openai.base_url)
        .with_timeout_secs(config.openai.request_timeout_secs)?;
    Ok(Arc::new(provider))
}
