//! # voca-store
//!
//! Durable mapping from vocabulary word to generated [`voca_core::Skill`].
//!
//! The `skills` table carries a `UNIQUE(word)` constraint. An insert that
//! loses a race to a concurrent request for the same word fails with
//! [`voca_core::VocaError::SkillConflict`], and the caller re-reads the
//! winner's row. No explicit locking is involved.

pub mod store;

pub use store::SkillStore;
