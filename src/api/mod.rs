//! HTTP API.
//!
//! JSON endpoints for authentication, summarization, chat and history.
//! Everything except `/`, `/health`, `/signup` and `/login` needs a bearer token.

mod auth;
mod error;
mod handlers;

pub use auth::CurrentUser;
pub use error::ApiError;
pub use handlers::{SourceFields, SummarizeResponse, SummaryResponse};

use crate::auth::AuthService;
use crate::config::ServerSettings;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub auth: AuthService,
}

/// Build the application router.
pub fn router(state: Arc<AppState>, server: &ServerSettings) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/me", get(handlers::me))
        .route("/summarize", post(handlers::summarize))
        .route("/summarize/file", post(handlers::summarize_file))
        .route("/chat", post(handlers::chat))
        .route("/history", get(handlers::history))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` allows any origin without credentials; an explicit list allows credentials.
fn cors_layer(server: &ServerSettings) -> CorsLayer {
    if server.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
