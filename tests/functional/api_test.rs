//! Functional tests for the HTTP view adapter

use anime_portrait::api::create_router;
use anime_portrait::backend::{GeneratedResult, GenerationClient};
use anime_portrait::config::Settings;
use anime_portrait::error::GenerationFailure;
use anime_portrait::session::{SessionController, SessionHandle};
use anime_portrait::AppState;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct ScriptedClient {
    outcomes: Mutex<VecDeque<Result<GeneratedResult, GenerationFailure>>>,
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _base64_payload: &str,
        _mime_type: &str,
    ) -> Result<GeneratedResult, GenerationFailure> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationFailure::NoImageReturned))
    }
}

fn create_test_app(outcomes: Vec<Result<GeneratedResult, GenerationFailure>>) -> Router {
    let client = Arc::new(ScriptedClient {
        outcomes: Mutex::new(outcomes.into()),
    });
    let state = Arc::new(AppState {
        settings: Arc::new(Settings::default()),
        session: SessionHandle::spawn(SessionController::new(client)),
    });
    create_router(state)
}

fn anime() -> Result<GeneratedResult, GenerationFailure> {
    GeneratedResult::from_inline(Some("image/png"), "YW5pbWU=")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn upload_request(content_type: &str, name: &str, body: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/session/upload")
        .header(header::CONTENT_TYPE, content_type)
        .header("x-file-name", name)
        .body(Body::from(body))
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app(vec![]);
    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_initial_session_is_idle() {
    let app = create_test_app(vec![]);
    let (status, body) = send_json(&app, get("/api/session")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "IDLE");
    assert!(body["uploaded"].is_null());
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn test_upload_generate_download_reset() {
    let app = create_test_app(vec![anime()]);

    let (status, body) =
        send_json(&app, upload_request("image/jpeg", "photo.jpg", b"Hello, World!")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "PREVIEW");
    assert_eq!(body["uploaded"]["file_name"], "photo.jpg");
    assert_eq!(
        body["uploaded"]["preview_url"],
        "data:image/jpeg;base64,SGVsbG8sIFdvcmxkIQ=="
    );

    let (status, body) = send_json(&app, post("/api/session/generate")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "SUCCESS");
    assert_eq!(body["result"]["image_url"], "data:image/png;base64,YW5pbWU=");
    assert!(body["error"].is_null());

    let (status, headers, bytes) = send(&app, get("/api/session/download")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"anime");
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"anime-portrait-"));
    assert!(disposition.ends_with(".png\""));

    let (status, body) = send_json(&app, post("/api/session/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "IDLE");
    assert!(body["uploaded"].is_null());
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn test_non_image_upload_is_rejected() {
    let app = create_test_app(vec![]);

    let (status, body) =
        send_json(&app, upload_request("application/pdf", "document.pdf", b"%PDF-1.7")).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["code"], "invalid_input_kind");

    let (_, body) = send_json(&app, get("/api/session")).await;
    assert_eq!(body["phase"], "IDLE");
    assert_eq!(body["notice"], "Please upload an image file");
}

#[tokio::test]
async fn test_failed_generation_keeps_preview() {
    let app = create_test_app(vec![Err(GenerationFailure::Transport("boom".to_string()))]);
    send_json(&app, upload_request("image/png", "selfie.png", b"\x89PNG")).await;

    let (status, body) = send_json(&app, post("/api/session/generate")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "PREVIEW");
    assert_eq!(body["uploaded"]["file_name"], "selfie.png");
    assert_eq!(
        body["error"],
        "Something went wrong while generating the anime portrait. Please try again."
    );
}

#[tokio::test]
async fn test_generate_without_upload_is_noop() {
    let app = create_test_app(vec![anime()]);

    let (status, body) = send_json(&app, post("/api/session/generate")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "IDLE");
}

#[tokio::test]
async fn test_download_without_result_is_not_found() {
    let app = create_test_app(vec![]);
    let (status, body) = send_json(&app, get("/api/session/download")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "no_result");
}
