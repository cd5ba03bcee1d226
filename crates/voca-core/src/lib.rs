//! # voca-core
//!
//! Core types and errors shared by every crate in the voca workspace:
//! the persisted [`Skill`] record, the response shape returned to clients,
//! and the unified [`VocaError`].

pub mod error;
pub mod skill;

pub use error::{Result, VocaError};
pub use skill::{ImageStatus, NewSkill, Skill, SkillOrigin, SkillResult, NO_IMAGE_STORED};
