//! HTTP API server.

use crate::api::{self, AppState};
use crate::auth::AuthService;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::store::{SqliteStore, Store};
use std::sync::Arc;

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    if settings.llm.api_key.is_none() {
        Output::warning("GOOGLE_API_KEY is not set; summaries and chat will fail.");
    }

    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&settings.database_path())?);
    let auth = AuthService::from_settings(store.clone(), &settings.auth)?;
    let server = settings.server.clone();
    let orchestrator = Orchestrator::with_store(settings, store)?;

    let state = Arc::new(AppState { orchestrator, auth });
    let app = api::router(state, &server);

    let addr = format!(
        "{}:{}",
        host.as_deref().unwrap_or(&server.host),
        port.unwrap_or(server.port)
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Recap API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Sign up", "POST /signup");
    Output::kv("Log in", "POST /login");
    Output::kv("Current user", "GET  /me");
    Output::kv("Summarize URL", "POST /summarize");
    Output::kv("Summarize PDF", "POST /summarize/file");
    Output::kv("Chat", "POST /chat");
    Output::kv("History", "GET  /history");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
