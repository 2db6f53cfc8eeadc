//! End-to-end tests for the HTTP API with fake extraction and generation backends.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use recap::api::{self, AppState};
use recap::auth::{AuthService, TokenService};
use recap::config::{Prompts, Settings};
use recap::generation::{GenerationError, LanguageModel};
use recap::orchestrator::Orchestrator;
use recap::source::{
    MetadataProvider, TranscriptProvider, TranscriptSegment, TranscriptTrack, VideoMetadata,
    YoutubeExtractor,
};
use recap::store::SqliteStore;
use recap::RecapError;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

struct FakeModel {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError::new("error sending request: connection refused"));
        }
        if prompt.contains("Question:") {
            Ok("It is about Rust.".to_string())
        } else {
            Ok(format!("Summary #{}", n + 1))
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        Ok(vec!["gemini-flash-latest".to_string()])
    }
}

/// Serves a fixed transcript; metadata lookups always fail.
struct FakeYoutube;

#[async_trait]
impl TranscriptProvider for FakeYoutube {
    async fn list_tracks(&self, video_id: &str) -> recap::Result<Vec<TranscriptTrack>> {
        Ok(vec![TranscriptTrack {
            language: "en".to_string(),
            name: None,
            generated: true,
            url: format!("https://example.com/{}", video_id),
        }])
    }

    async fn fetch_segments(&self, _track: &TranscriptTrack) -> recap::Result<Vec<TranscriptSegment>> {
        Ok(vec![TranscriptSegment {
            text: "ownership and borrowing".to_string(),
            start_seconds: 0.0,
            duration_seconds: 2.5,
        }])
    }
}

#[async_trait]
impl MetadataProvider for FakeYoutube {
    async fn fetch_metadata(&self, _url: &str) -> recap::Result<VideoMetadata> {
        Err(RecapError::MetadataUnavailable("HTTP Error 429".to_string()))
    }
}

struct TestApp {
    router: Router,
    model: Arc<FakeModel>,
    _dir: tempfile::TempDir,
}

fn app(fail: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.general.temp_dir = dir.path().join("tmp").to_string_lossy().to_string();

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let model = Arc::new(FakeModel {
        fail,
        calls: AtomicUsize::new(0),
    });
    let fake = Arc::new(FakeYoutube);
    let youtube = YoutubeExtractor::new(fake.clone(), fake, "en");

    let orchestrator = Orchestrator::with_components(
        settings.clone(),
        Prompts::default(),
        youtube,
        model.clone(),
        store.clone(),
    )
    .unwrap();
    let auth = AuthService::new(store, TokenService::new("integration-secret", 60));

    let state = Arc::new(AppState { orchestrator, auth });
    TestApp {
        router: api::router(state, &settings.server),
        model,
        _dir: dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn upload(token: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "recap-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = boundary,
            f = filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::post("/summarize/file")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

async fn signup(router: &Router, email: &str) -> String {
    let (status, body) = send(
        router,
        post_json("/signup", None, json!({ "email": email, "password": "pw-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = app(false);

    let (status, body) = send(&app.router, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Recap API is running" }));

    let (_, body) = send(&app.router, get("/health", None)).await;
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_signup_login_me() {
    let app = app(false);
    let token = signup(&app.router, "ada@example.com").await;

    let (status, body) = send(&app.router, get("/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["id"].is_i64());

    let (status, body) = send(
        &app.router,
        post_json(
            "/login",
            None,
            json!({ "email": "ada@example.com", "password": "pw-123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["email"], "ada@example.com");

    let (status, body) = send(
        &app.router,
        post_json(
            "/login",
            None,
            json!({ "email": "ada@example.com", "password": "nope" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Incorrect email or password");
}

#[tokio::test]
async fn test_duplicate_and_invalid_signup() {
    let app = app(false);
    signup(&app.router, "ada@example.com").await;

    let (status, body) = send(
        &app.router,
        post_json("/signup", None, json!({ "email": "ada@example.com", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Email already registered");

    let (status, _) = send(
        &app.router,
        post_json("/signup", None, json!({ "email": "not-an-email", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_protected_routes_need_token() {
    let app = app(false);

    let (status, _) = send(&app.router, get("/history", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app.router, get("/me", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        post_json("/chat", None, json!({ "context": "c", "question": "q" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_youtube_summary_with_degraded_metadata() {
    let app = app(false);
    let token = signup(&app.router, "ada@example.com").await;

    let (status, body) = send(
        &app.router,
        post_json(
            "/summarize",
            Some(&token),
            json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "content_type": "youtube" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["type"], "youtube");
    assert_eq!(body["video_id"], "dQw4w9WgXcQ");
    assert_eq!(body["content"], "ownership and borrowing");
    assert_eq!(body["summary"], "Summary #1");
    assert!(body["metadata"]["error"].as_str().unwrap().contains("429"));
    assert!(body["metadata"].get("title").is_none());

    let (_, history) = send(&app.router, get("/history", Some(&token))).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["title"], "https://youtu.be/dQw4w9WgXcQ");
    assert_eq!(history[0]["video_id"], "dQw4w9WgXcQ");
}

#[tokio::test]
async fn test_coming_soon_and_bad_urls() {
    let app = app(false);
    let token = signup(&app.router, "ada@example.com").await;

    let (status, body) = send(
        &app.router,
        post_json("/summarize", Some(&token), json!({ "content_type": "csv" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "csv summarization is coming soon!" }));

    for declared in ["pdf", "YouTube"] {
        let (status, body) = send(
            &app.router,
            post_json(
                "/summarize",
                Some(&token),
                json!({ "url": "https://youtu.be/dQw4w9WgXcQ", "content_type": declared }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "message": format!("{} summarization is coming soon!", declared) })
        );
    }

    let (status, body) = send(
        &app.router,
        post_json("/summarize", Some(&token), json!({ "content_type": "youtube" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "URL is required for YouTube summary");

    let (status, body) = send(
        &app.router,
        post_json(
            "/summarize",
            Some(&token),
            json!({ "url": "https://example.com", "content_type": "youtube" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid YouTube URL");

    assert_eq!(app.model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generation_failure_fails_summary_and_degrades_chat() {
    let app = app(true);
    let token = signup(&app.router, "ada@example.com").await;

    let (status, body) = send(
        &app.router,
        post_json(
            "/summarize",
            Some(&token),
            json!({ "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "content_type": "youtube" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Error with AI generation: "));

    let (_, history) = send(&app.router, get("/history", Some(&token))).await;
    assert_eq!(history, json!([]));

    let (status, body) = send(
        &app.router,
        post_json(
            "/chat",
            Some(&token),
            json!({ "context": "c", "question": "q" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "answer": "Error with AI generation: error sending request: connection refused" })
    );
}

#[tokio::test]
async fn test_web_summary_through_router() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Borrow Checker</title></head><body><p>References must not outlive data.</p></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let app = app(false);
    let token = signup(&app.router, "ada@example.com").await;
    let url = format!("{}/post", server.uri());

    let (status, body) = send(
        &app.router,
        post_json("/summarize", Some(&token), json!({ "url": url, "content_type": "web" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "web");
    assert_eq!(body["title"], "Borrow Checker");
    assert_eq!(body["url"], url.as_str());
    assert_eq!(body["summary"], "Summary #1");

    let gone = format!("{}/gone", server.uri());
    let (status, _) = send(
        &app.router,
        post_json("/summarize", Some(&token), json!({ "url": gone, "content_type": "web" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, history) = send(&app.router, get("/history", Some(&token))).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["title"], "Borrow Checker");
    assert_eq!(history[0]["url"], url.as_str());
    assert_eq!(app.model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_pdf_upload_is_rejected() {
    let app = app(false);
    let token = signup(&app.router, "ada@example.com").await;

    let (status, body) = send(&app.router, upload(&token, "report.txt", b"hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Only PDF files are supported currently");

    let (_, history) = send(&app.router, get("/history", Some(&token))).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_broken_pdf_upload_is_500() {
    let app = app(false);
    let token = signup(&app.router, "ada@example.com").await;

    let (status, body) = send(&app.router, upload(&token, "broken.pdf", b"not a pdf")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Error extracting PDF: "));
}

#[tokio::test]
async fn test_chat_with_history() {
    let app = app(false);
    let token = signup(&app.router, "ada@example.com").await;

    let (status, body) = send(
        &app.router,
        post_json(
            "/chat",
            Some(&token),
            json!({
                "context": "A talk about Rust.",
                "question": "What is it about?",
                "history": [
                    { "role": "user", "content": "Hi" },
                    { "role": "assistant", "content": "Hello" }
                ]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "answer": "It is about Rust." }));
}

#[tokio::test]
async fn test_history_is_newest_first_and_per_user() {
    let app = app(false);
    let ada = signup(&app.router, "ada@example.com").await;
    let bob = signup(&app.router, "bob@example.com").await;

    for url in ["https://youtu.be/aaaaaaaaaaa", "https://youtu.be/bbbbbbbbbbb"] {
        let (status, _) = send(
            &app.router,
            post_json(
                "/summarize",
                Some(&ada),
                json!({ "url": url, "content_type": "youtube" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, history) = send(&app.router, get("/history", Some(&ada))).await;
    let ids: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["video_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["bbbbbbbbbbb", "aaaaaaaaaaa"]);

    let (_, history) = send(&app.router, get("/history", Some(&bob))).await;
    assert_eq!(history, json!([]));
}
