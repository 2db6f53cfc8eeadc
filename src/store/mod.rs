//! Persistence for users and summary history.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of a summary record supplied by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSummary {
    pub user_id: i64,
    pub title: String,
    pub url: Option<String>,
    pub summary: String,
    pub content: String,
    pub content_type: String,
    pub video_id: Option<String>,
}

/// One entry of a user's append-only summary history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: i64,
    pub title: String,
    pub url: Option<String>,
    pub summary: String,
    /// Full transcript or page/document text.
    pub content: String,
    pub video_id: Option<String>,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}

/// Trait for persistence backends.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a user. Fails with `EmailTaken` if the email is registered.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Append a summary record (single insert, committed immediately).
    async fn insert_summary(&self, summary: &NewSummary) -> Result<SummaryRecord>;

    /// A user's summaries, newest first.
    async fn list_summaries(&self, user_id: i64) -> Result<Vec<SummaryRecord>>;
}
