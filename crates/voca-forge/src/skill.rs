use std::sync::Arc;
use tracing::{debug, error, info, warn};
use voca_core::{NewSkill, Result, SkillOrigin, SkillResult, VocaError};
use voca_llm::{ChatProvider, ChatRequest};
use voca_store::SkillStore;

use crate::parse;
use crate::prompts;
use crate::retry::ImageGenerator;

/// Parse the model's skill JSON for `word`.
///
/// `damage` is taken as given; the 10–100 range and the word-in-name rule
/// are requested in the prompt but not enforced.
pub fn parse_skill(word: &str, raw: &str) -> Result<NewSkill> {
    let obj = parse::json_object(raw)?;
    let skill = NewSkill {
        word: word.to_string(),
        name: parse::text_field(&obj, "name")?,
        description: parse::text_field(&obj, "description")?,
        damage: parse::int_field(&obj, "damage")?,
        image_desc: parse::text_field(&obj, "image_desc")?,
    };
    if !skill.name.to_lowercase().contains(&word.to_lowercase()) {
        warn!(word, name = %skill.name, "generated skill name does not contain the word");
    }
    Ok(skill)
}

/// Cache-then-create-then-enrich skill generation.
#[derive(Clone)]
pub struct SkillForge {
    chat: Arc<dyn ChatProvider>,
    chat_model: String,
    store: SkillStore,
    images: ImageGenerator,
}

impl SkillForge {
    pub fn new(
        chat: Arc<dyn ChatProvider>,
        chat_model: impl Into<String>,
        store: SkillStore,
        images: ImageGenerator,
    ) -> Self {
        Self {
            chat,
            chat_model: chat_model.into(),
            store,
            images,
        }
    }

    pub fn store(&self) -> &SkillStore {
        &self.store
    }

    /// Return the stored skill for `word`, creating it (text, then image) on
    /// first request.
    ///
    /// Errors are reserved for failures before anything is persisted (chat
    /// API, malformed reply, store). A failed image step is reported in the
    /// result with `FAILED` status and the error text.
    pub async fn generate_skill(&self, word: &str, meaning_ko: &str) -> Result<SkillResult> {
        if let Some(existing) = self.store.find_by_word(word)? {
            debug!(word, id = existing.id, "skill cache hit");
            return Ok(SkillResult::from_stored(existing, SkillOrigin::Cached));
        }

        let request = ChatRequest::new(&self.chat_model, prompts::skill_user_prompt(word, meaning_ko))
            .with_system(prompts::SKILL_SYSTEM)
            .json();
        let reply = self.chat.complete(&request).await?;
        let new_skill = parse_skill(word, &reply)?;

        let saved = match self.store.insert(&new_skill) {
            Ok(saved) => saved,
            Err(VocaError::SkillConflict { .. }) => {
                info!(word, "lost insert race, returning the stored skill");
                let winner = self.store.find_by_word(word)?.ok_or_else(|| {
                    VocaError::Store(format!("insert for '{word}' conflicted but no row could be read back"))
                })?;
                return Ok(SkillResult::from_stored(winner, SkillOrigin::RaceLost));
            }
            Err(e) => return Err(e),
        };
        info!(word, id = saved.id, name = %saved.name, damage = saved.damage, "skill created");

        let image = match self.images.generate_image(&saved.image_desc).await {
            Ok(image) => image,
            Err(e) => {
                warn!(word, error = %e, "skill stored without image");
                return Ok(SkillResult::image_failed(saved, e.to_string()));
            }
        };

        match self.store.update_image(saved.id, &image) {
            Ok(updated) => Ok(SkillResult::from_stored(updated, SkillOrigin::Created)),
            Err(e) => {
                error!(word, error = %e, "failed to store generated image");
                Ok(SkillResult::image_failed(saved, e.to_string()))
            }
        }
    }
}
