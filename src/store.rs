//! `store`: SQLite-backed write-once memo for subjects and topic content.
//!
//! Two tables keyed by natural identity:
//!
//! ```text
//! subjects (name PK, syllabus JSON, created_at)
//! contents (subject_name FK → subjects.name, chapter, topic, document, created_at,
//!           PK (subject_name, chapter, topic))
//! ```
//!
//! Lookups are exact-match. There is no update or delete path. Uniqueness is
//! enforced by the schema and surfaces as [`StoreError::Conflict`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use thiserror::Error;

use crate::model::{Chapter, Content, Subject};

const DB_FILENAME: &str = "tutor.db";
const SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

/// Row counts reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub subjects: u64,
    pub contents: u64,
}

/// Handle to the database file. Cheap to clone; every call opens its own
/// connection so handles can be shared across request tasks.
#[derive(Debug, Clone)]
pub struct StudyStore {
    db_path: PathBuf,
}

impl StudyStore {
    /// Open (creating if needed) `tutor.db` under `work_dir`.
    pub fn open(work_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(work_dir).map_err(|e| {
            StoreError::Db(format!("cannot create {}: {e}", work_dir.display()))
        })?;
        let store = Self { db_path: work_dir.join(DB_FILENAME) };
        store.init_db()?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn find_subject(&self, name: &str) -> Result<Option<Subject>, StoreError> {
        let conn = self.open_conn()?;
        let row = conn
            .query_row(
                "SELECT syllabus, created_at FROM subjects WHERE name = ?1",
                params![name],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|e| StoreError::Db(format!("find_subject {name}: {e}")))?;

        let Some((syllabus_json, created_at)) = row else {
            return Ok(None);
        };
        let syllabus: Vec<Chapter> = serde_json::from_str(&syllabus_json)
            .map_err(|e| StoreError::Db(format!("decode syllabus for {name}: {e}")))?;

        Ok(Some(Subject { name: name.to_string(), syllabus, created_at }))
    }

    pub fn create_subject(&self, name: &str, syllabus: &[Chapter]) -> Result<(), StoreError> {
        let syllabus_json = serde_json::to_string(syllabus)
            .map_err(|e| StoreError::Db(format!("encode syllabus for {name}: {e}")))?;

        let conn = self.open_conn()?;
        conn.execute(
            "INSERT INTO subjects (name, syllabus, created_at) VALUES (?1, ?2, ?3)",
            params![name, syllabus_json, now_rfc3339()],
        )
        .map_err(|e| insert_error(e, || format!("subject '{name}'")))?;
        Ok(())
    }

    pub fn find_content(
        &self,
        subject_name: &str,
        chapter: &str,
        topic: &str,
    ) -> Result<Option<Content>, StoreError> {
        let conn = self.open_conn()?;
        conn.query_row(
            "SELECT document, created_at FROM contents
             WHERE subject_name = ?1 AND chapter = ?2 AND topic = ?3",
            params![subject_name, chapter, topic],
            |row| {
                Ok(Content {
                    subject_name: subject_name.to_string(),
                    chapter: chapter.to_string(),
                    topic: topic.to_string(),
                    document: row.get(0)?,
                    created_at: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(|e| StoreError::Db(format!("find_content {subject_name}/{chapter}/{topic}: {e}")))
    }

    /// Insert a content document. The subject must already exist.
    pub fn create_content(
        &self,
        subject_name: &str,
        chapter: &str,
        topic: &str,
        document: &str,
    ) -> Result<(), StoreError> {
        let mut conn = self.open_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Db(format!("begin create_content tx: {e}")))?;

        let subject_exists = tx
            .query_row(
                "SELECT 1 FROM subjects WHERE name = ?1",
                params![subject_name],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| StoreError::Db(format!("check subject {subject_name}: {e}")))?
            .is_some();
        if !subject_exists {
            return Err(StoreError::NotFound(format!("subject '{subject_name}'")));
        }

        tx.execute(
            "INSERT INTO contents (subject_name, chapter, topic, document, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![subject_name, chapter, topic, document, now_rfc3339()],
        )
        .map_err(|e| insert_error(e, || format!("content '{subject_name}/{chapter}/{topic}'")))?;

        tx.commit()
            .map_err(|e| StoreError::Db(format!("commit create_content: {e}")))?;
        Ok(())
    }

    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        let conn = self.open_conn()?;
        let count = |table: &str| -> Result<u64, StoreError> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get::<_, i64>(0))
                .map(|n| n as u64)
                .map_err(|e| StoreError::Db(format!("count {table}: {e}")))
        };
        Ok(StoreCounts { subjects: count("subjects")?, contents: count("contents")? })
    }

    fn init_db(&self) -> Result<(), StoreError> {
        let conn = self.open_conn()?;
        let version: i64 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .map_err(|e| StoreError::Db(format!("read schema version: {e}")))?;

        if version == 0 {
            conn.execute_batch(
                "
                CREATE TABLE IF NOT EXISTS subjects (
                    name TEXT PRIMARY KEY,
                    syllabus TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS contents (
                    subject_name TEXT NOT NULL REFERENCES subjects(name),
                    chapter TEXT NOT NULL,
                    topic TEXT NOT NULL,
                    document TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (subject_name, chapter, topic)
                );

                PRAGMA user_version = 1;
                ",
            )
            .map_err(|e| StoreError::Db(format!("initialize schema: {e}")))?;
            return Ok(());
        }

        if version != SCHEMA_VERSION {
            return Err(StoreError::Db(format!(
                "unsupported schema version {version}, expected {SCHEMA_VERSION}"
            )));
        }
        Ok(())
    }

    fn open_conn(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)
            .map_err(|e| StoreError::Db(format!("open {}: {e}", self.db_path.display())))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StoreError::Db(format!("set journal_mode WAL: {e}")))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| StoreError::Db(format!("set foreign_keys ON: {e}")))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| StoreError::Db(format!("set busy_timeout: {e}")))?;

        Ok(conn)
    }
}

/// Map an INSERT failure: constraint violations become `Conflict`.
fn insert_error(e: rusqlite::Error, what: impl FnOnce() -> String) -> StoreError {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => StoreError::Conflict(what()),
        _ => StoreError::Db(format!("insert {}: {e}", what())),
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
