use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use voca_core::{NewSkill, Skill, VocaError};

const SKILL_COLUMNS: &str = "id, word, name, description, damage, image_desc, image_base64";

/// SQLite-backed skill store. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct SkillStore {
    db: Arc<Mutex<Connection>>,
}

fn store_err(e: rusqlite::Error) -> VocaError {
    VocaError::Store(e.to_string())
}

/// Only `UNIQUE` failures mean another writer stored the word first.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn row_to_skill(row: &Row<'_>) -> rusqlite::Result<Skill> {
    Ok(Skill {
        id: row.get(0)?,
        word: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        damage: row.get(4)?,
        image_desc: row.get(5)?,
        image_base64: row.get(6)?,
    })
}

impl SkillStore {
    /// Open or create the skill database at the given path.
    pub fn open(path: &Path) -> voca_core::Result<Self> {
        info!(?path, "opening skill store");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(store_err)?;

        // WAL for concurrent readers; busy_timeout so a second process waits
        // instead of failing on a locked database.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=5000;")
            .map_err(store_err)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS skills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                damage INTEGER NOT NULL,
                image_desc TEXT NOT NULL,
                image_base64 TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CONSTRAINT uk_skill_word UNIQUE (word)
            );
            ",
        )
        .map_err(store_err)?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> voca_core::Result<Self> {
        Self::open(Path::new(":memory:"))
    }

    /// Exact, case-sensitive lookup by word.
    pub fn find_by_word(&self, word: &str) -> voca_core::Result<Option<Skill>> {
        let db = self.db.lock();
        db.query_row(
            &format!("SELECT {SKILL_COLUMNS} FROM skills WHERE word = ?1"),
            rusqlite::params![word],
            row_to_skill,
        )
        .optional()
        .map_err(store_err)
    }

    pub fn find_by_id(&self, id: i64) -> voca_core::Result<Option<Skill>> {
        let db = self.db.lock();
        db.query_row(
            &format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = ?1"),
            rusqlite::params![id],
            row_to_skill,
        )
        .optional()
        .map_err(store_err)
    }

    /// Insert a new skill without an image.
    ///
    /// Fails with [`VocaError::SkillConflict`] if the word is already stored.
    pub fn insert(&self, skill: &NewSkill) -> voca_core::Result<Skill> {
        let db = self.db.lock();
        let now = chrono::Utc::now().to_rfc3339();
        db.execute(
            "INSERT INTO skills (word, name, description, damage, image_desc, image_base64, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)",
            rusqlite::params![
                skill.word,
                skill.name,
                skill.description,
                skill.damage,
                skill.image_desc,
                now
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                VocaError::SkillConflict {
                    word: skill.word.clone(),
                }
            } else {
                store_err(e)
            }
        })?;

        let id = db.last_insert_rowid();
        debug!(id, word = %skill.word, "inserted skill");
        Ok(Skill {
            id,
            word: skill.word.clone(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            damage: skill.damage,
            image_desc: skill.image_desc.clone(),
            image_base64: None,
        })
    }

    /// Store the image of an existing skill and return the updated record.
    pub fn update_image(&self, id: i64, image_base64: &str) -> voca_core::Result<Skill> {
        let rows = {
            let db = self.db.lock();
            let now = chrono::Utc::now().to_rfc3339();
            db.execute(
                "UPDATE skills SET image_base64 = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![image_base64, now, id],
            )
            .map_err(store_err)?
        };
        if rows == 0 {
            return Err(VocaError::Store(format!("no skill with id {id}")));
        }
        self.find_by_id(id)?
            .ok_or_else(|| VocaError::Store(format!("skill {id} vanished after update")))
    }

    /// Number of stored skills.
    pub fn count(&self) -> voca_core::Result<usize> {
        let db = self.db.lock();
        let n: i64 = db
            .query_row("SELECT COUNT(*) FROM skills", [], |row| row.get(0))
            .map_err(store_err)?;
        Ok(n as usize)
    }

    /// Most recently created skills first.
    pub fn recent(&self, limit: usize) -> voca_core::Result<Vec<Skill>> {
        let db = self.db.lock();
        let mut stmt = db
            .prepare(&format!("SELECT {SKILL_COLUMNS} FROM skills ORDER BY id DESC LIMIT ?1"))
            .map_err(store_err)?;
        let rows = stmt
            .query_map(rusqlite::params![limit as i64], row_to_skill)
            .map_err(store_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(store_err)
    }
}
