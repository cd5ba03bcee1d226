use serde::{Deserialize, Serialize};

/// Reason reported when a stored skill has no image yet.
pub const NO_IMAGE_STORED: &str = "no image stored for this word";

/// A persisted skill record, keyed by its vocabulary word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub word: String,
    pub name: String,
    pub description: String,
    pub damage: i32,
    pub image_desc: String,
    /// `None` until an image generation succeeds.
    pub image_base64: Option<String>,
}

impl Skill {
    /// True when a non-blank image payload is stored.
    pub fn has_image(&self) -> bool {
        self.image_base64
            .as_deref()
            .is_some_and(|b64| !b64.trim().is_empty())
    }
}

/// A skill as produced by the model, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSkill {
    pub word: String,
    pub name: String,
    pub description: String,
    pub damage: i32,
    pub image_desc: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageStatus {
    Success,
    Failed,
}

/// Where a [`SkillResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillOrigin {
    /// The word was already stored; no upstream calls were made.
    Cached,
    /// This request created the record.
    Created,
    /// Another request inserted the word first; its record was returned.
    RaceLost,
}

/// Response body of a skill generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResult {
    pub id: i64,
    pub word: String,
    pub name: String,
    pub description: String,
    pub damage: i32,
    pub image_desc: String,
    pub image_base64: Option<String>,
    pub image_status: ImageStatus,
    pub image_error: Option<String>,
    #[serde(skip, default = "default_origin")]
    pub origin: SkillOrigin,
}

fn default_origin() -> SkillOrigin {
    SkillOrigin::Cached
}

impl SkillResult {
    /// Report a stored record as-is: `SUCCESS` when it carries an image,
    /// otherwise `FAILED` with [`NO_IMAGE_STORED`].
    pub fn from_stored(skill: Skill, origin: SkillOrigin) -> Self {
        let (image_status, image_error) = if skill.has_image() {
            (ImageStatus::Success, None)
        } else {
            (ImageStatus::Failed, Some(NO_IMAGE_STORED.to_string()))
        };
        Self {
            id: skill.id,
            word: skill.word,
            name: skill.name,
            description: skill.description,
            damage: skill.damage,
            image_desc: skill.image_desc,
            image_base64: skill.image_base64,
            image_status,
            image_error,
            origin,
        }
    }

    /// A freshly created record whose image generation failed.
    pub fn image_failed(skill: Skill, error: impl Into<String>) -> Self {
        Self {
            id: skill.id,
            word: skill.word,
            name: skill.name,
            description: skill.description,
            damage: skill.damage,
            image_desc: skill.image_desc,
            image_base64: None,
            image_status: ImageStatus::Failed,
            image_error: Some(error.into()),
            origin: SkillOrigin::Created,
        }
    }

    pub fn is_success(&self) -> bool {
        self.image_status == ImageStatus::Success
    }
}
