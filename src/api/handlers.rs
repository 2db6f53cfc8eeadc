//! Route handlers.

use super::{auth::CurrentUser, error::ApiError, AppState};
use crate::auth::{Credentials, Session};
use crate::orchestrator::{SummarizeOutcome, Summary};
use crate::prompt::ChatTurn;
use crate::source::{SourceDetails, VideoMetadata};
use crate::store::SummaryRecord;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

// === Request/Response Types ===

#[derive(Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub url: Option<String>,
    pub content_type: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub context: String,
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub email: String,
    pub id: i64,
}

/// Source-specific fields of a summary response, tagged by `type`.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceFields {
    YouTube {
        video_id: String,
        metadata: VideoMetadata,
    },
    Web {
        title: String,
        url: String,
    },
    Pdf {
        filename: String,
    },
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub content: String,
    #[serde(flatten)]
    pub source: SourceFields,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        let extraction = summary.extraction;
        let source = match extraction.details {
            SourceDetails::YouTube {
                video_id, metadata, ..
            } => SourceFields::YouTube { video_id, metadata },
            SourceDetails::Web { url } => SourceFields::Web {
                title: extraction.title.unwrap_or_else(|| url.clone()),
                url,
            },
            SourceDetails::Pdf { filename } => SourceFields::Pdf { filename },
        };

        Self {
            summary: summary.summary,
            content: extraction.text,
            source,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum SummarizeResponse {
    Summary(SummaryResponse),
    Message { message: String },
}

// === Handlers ===

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Recap API is running" }))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.auth.signup(&credentials).await?))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.auth.login(&credentials).await?))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        email: user.email,
        id: user.id,
    })
}

pub async fn summarize(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .summarize(user.id, &req.content_type, req.url.as_deref())
        .await?;

    Ok(Json(match outcome {
        SummarizeOutcome::Completed(summary) => SummarizeResponse::Summary(summary.into()),
        SummarizeOutcome::ComingSoon(message) => SummarizeResponse::Message { message },
    }))
}

pub async fn summarize_file(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<SummaryResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        info!("Received upload {:?} ({} bytes)", filename, bytes.len());

        let summary = state
            .orchestrator
            .summarize_upload(user.id, &filename, &bytes)
            .await?;
        return Ok(Json(summary.into()));
    }

    Err(ApiError::bad_request("No file uploaded"))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    debug!("Handling chat request with {} prior turns", req.history.len());
    let answer = state
        .orchestrator
        .chat(&req.context, &req.question, &req.history)
        .await;
    Json(ChatResponse { answer })
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<SummaryRecord>>, ApiError> {
    Ok(Json(state.orchestrator.history(user.id).await?))
}
