//! SQLite-based store implementation.

use super::{NewSummary, Store, SummaryRecord, User};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        hashed_password TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS summary_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT,
        summary TEXT NOT NULL,
        content TEXT NOT NULL,
        video_id TEXT,
        content_type TEXT NOT NULL,
        created_at TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id)
    );

    CREATE INDEX IF NOT EXISTS idx_summary_history_user ON summary_history(user_id, created_at);
"#;

/// SQLite-based store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RecapError::Store(format!("Failed to acquire lock: {}", e)))
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort lexically.
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Read an RFC 3339 column, reporting malformed values as a conversion error.
fn timestamp_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        hashed_password: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
    })
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SummaryRecord> {
    Ok(SummaryRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        summary: row.get(3)?,
        content: row.get(4)?,
        video_id: row.get(5)?,
        content_type: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
        user_id: row.get(8)?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    #[instrument(skip(self, hashed_password))]
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User> {
        let conn = self.lock()?;
        let created_at = Utc::now();

        let inserted = conn.execute(
            "INSERT INTO users (email, hashed_password, created_at) VALUES (?1, ?2, ?3)",
            params![email, hashed_password, timestamp(&created_at)],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(RecapError::EmailTaken);
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        info!("Created user {}", id);

        Ok(User {
            id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at,
        })
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                "SELECT id, email, hashed_password, created_at FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    #[instrument(skip(self, summary), fields(user_id = summary.user_id))]
    async fn insert_summary(&self, summary: &NewSummary) -> Result<SummaryRecord> {
        let conn = self.lock()?;
        let created_at = Utc::now();

        conn.execute(
            r#"
            INSERT INTO summary_history
            (title, url, summary, content, video_id, content_type, created_at, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                summary.title,
                summary.url,
                summary.summary,
                summary.content,
                summary.video_id,
                summary.content_type,
                timestamp(&created_at),
                summary.user_id,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Stored summary {}", id);

        Ok(SummaryRecord {
            id,
            title: summary.title.clone(),
            url: summary.url.clone(),
            summary: summary.summary.clone(),
            content: summary.content.clone(),
            video_id: summary.video_id.clone(),
            content_type: summary.content_type.clone(),
            created_at,
            user_id: summary.user_id,
        })
    }

    #[instrument(skip(self))]
    async fn list_summaries(&self, user_id: i64) -> Result<Vec<SummaryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, url, summary, content, video_id, content_type, created_at, user_id
            FROM summary_history
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )?;

        let records = stmt
            .query_map(params![user_id], summary_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Found {} summaries for user {}", records.len(), user_id);
        Ok(records)
    }
}
