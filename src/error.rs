//! Error types for Recap.

use crate::generation::GenerationError;
use thiserror::Error;

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    InvalidUrl(String),

    #[error("Error fetching transcript: {0}")]
    TranscriptUnavailable(String),

    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("Error fetching page: {0}")]
    Fetch(String),

    #[error("Error extracting PDF: {0}")]
    PdfParse(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl RecapError {
    /// Whether the caller supplied something unusable (as opposed to a server-side failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecapError::InvalidInput(_)
                | RecapError::InvalidUrl(_)
                | RecapError::Validation(_)
                | RecapError::EmailTaken
                | RecapError::InvalidCredentials
                | RecapError::Unauthorized(_)
        )
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;
