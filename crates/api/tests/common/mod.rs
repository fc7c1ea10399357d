#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use pitchdeck_api::auth::jwt::{generate_token, JwtConfig};
use pitchdeck_api::config::ServerConfig;
use pitchdeck_api::router::build_app_router;
use pitchdeck_api::state::AppState;
use pitchdeck_db::repositories::InMemoryDeckRepo;
use pitchdeck_events::ProgressTracker;
use pitchdeck_pipeline::generator::{
    ContentGenerator, GeminiConfig, GenerationError, GenerationRequest,
};
use pitchdeck_pipeline::render::{RenderError, RenderFormat, SlideRenderer};
use pitchdeck_pipeline::storage::LocalStorage;
use pitchdeck_pipeline::{Collaborators, DeckService, Pipeline, PipelineSettings};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

// ---------------------------------------------------------------------------
// Fake collaborators
// ---------------------------------------------------------------------------

/// Answers with fixed markup once its gate is opened.
pub struct GatedGenerator {
    gate: Semaphore,
}

impl GatedGenerator {
    pub fn release(&self) {
        self.gate.add_permits(1_000);
    }
}

#[async_trait]
impl ContentGenerator for GatedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        let _permit = self.gate.acquire().await;
        Ok("---\nmarp: true\n---\n# Deck".to_string())
    }
}

/// Writes the markup back out as the "rendered" artifact.
pub struct CopyRenderer;

#[async_trait]
impl SlideRenderer for CopyRenderer {
    async fn render(
        &self,
        markdown: &Path,
        output: &Path,
        _format: RenderFormat,
        _theme: &str,
    ) -> Result<(), RenderError> {
        tokio::fs::copy(markdown, output).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and local storage under
/// `dir`.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            audience: None,
        },
        supabase: None,
        gemini: GeminiConfig::new("unused"),
        marp_command: "true".to_string(),
        pipeline: PipelineSettings {
            work_dir: dir.join("work"),
            uploads_dir: dir.join("uploads"),
            ..Default::default()
        },
        max_upload_bytes: 1024,
    }
}

pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    pub generator: Arc<GatedGenerator>,
    pub repo: Arc<InMemoryDeckRepo>,
    pub decks: Arc<DeckService>,
    pub dir: TempDir,
}

impl TestApp {
    /// A valid bearer token for `user_id`.
    pub fn token(&self, user_id: &str) -> String {
        generate_token(user_id, 3600, &self.config.jwt).expect("token")
    }
}

/// Build the full application router with all middleware layers, backed by
/// in-memory records, local storage and fake generation/rendering.
pub fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());

    let repo = Arc::new(InMemoryDeckRepo::new());
    let generator = Arc::new(GatedGenerator {
        gate: Semaphore::new(0),
    });
    let collaborators = Collaborators {
        repo: repo.clone(),
        generator: generator.clone(),
        renderer: Arc::new(CopyRenderer),
        storage: Arc::new(LocalStorage::new(
            config.pipeline.uploads_dir.clone(),
            "/uploads",
        )),
    };
    let pipeline = Pipeline::new(
        Arc::new(ProgressTracker::new()),
        collaborators,
        config.pipeline.clone(),
    );
    let decks = Arc::new(DeckService::new(pipeline, CancellationToken::new()));

    let state = AppState {
        config: Arc::new(config.clone()),
        decks: decks.clone(),
    };
    let router = build_app_router(state, &config);

    TestApp {
        router,
        config,
        generator,
        repo,
        decks,
        dir,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("infallible")
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// Single-part multipart body with `field` holding `bytes` as `filename`.
pub fn multipart_request(
    uri: &str,
    token: &str,
    field: &str,
    filename: &str,
    bytes: &[u8],
) -> Request<Body> {
    let boundary = "X-PITCHDECK-BOUNDARY";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    let collected = tokio::time::timeout(Duration::from_secs(10), response.into_body().collect())
        .await
        .expect("body should end")
        .expect("body");
    collected.to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("JSON body")
}

/// `data:` payloads of a server-sent event stream, parsed as JSON.
pub async fn sse_events(response: Response<Body>) -> Vec<Value> {
    let text = String::from_utf8(body_bytes(response).await).expect("utf-8 stream");
    text.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).expect("JSON event"))
        .collect()
}

pub fn minimal_deck() -> Value {
    serde_json::json!({
        "projectName": "Acme Rockets",
        "bigIdea": "Reusable rockets for small payloads",
        "theme": "gaia"
    })
}
