//! Axum HTTP server: JSON API under `/api/` plus the single study page.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api/health              → status, provider, row counts
//! GET  /api/subject?subject=…   → syllabus for a subject (cached or generated)
//! POST /api/content             → rendered content for one topic (JSON or form body)
//! GET  /favicon.ico             → 204
//! GET  /                        → study page
//! ```
//!
//! [`serve`] drives the axum event loop until the [`CancellationToken`]
//! fires, then shuts down gracefully.

mod api;
mod ui;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::study::StudyService;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: all fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub app_name: Arc<str>,
    pub study: Arc<StudyService>,
}

impl AppState {
    pub fn new(app_name: &str, study: StudyService) -> Self {
        Self { app_name: Arc::from(app_name), study: Arc::new(study) }
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

pub async fn serve(
    bind_addr: &str,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let app_name = state.app_name.clone();
    let router = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%app_name, %bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!(%app_name, "http server shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health",  get(api::health))
        .route("/api/subject", get(api::select_subject))
        .route("/api/content", post(api::get_content))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/",            get(ui::root))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::llm::providers::scripted::{ScriptedProvider, ScriptedReply};
    use crate::model::Chapter;
    use crate::study::tests::service;

    const JS_REPLY: &str =
        r#"Here you go: [{"title":"Basics","topics":["Variables","Functions"]}] Hope this helps!"#;

    fn router(script: &ScriptedProvider) -> (TempDir, AppState, Router) {
        let (tmp, svc) = service(script);
        let state = AppState::new("test", svc);
        (tmp, state.clone(), build_router(state))
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn seed(state: &AppState) {
        state
            .study
            .store()
            .create_subject(
                "Javascript",
                &[Chapter { title: "Basics".into(), topics: vec!["Variables".into()] }],
            )
            .unwrap();
    }

    #[tokio::test]
    async fn subject_endpoint_generates_then_caches() {
        let script = ScriptedProvider::with_text(&[JS_REPLY]);
        let (_tmp, _state, router) = router(&script);

        let (status, body) = send(router.clone(), get("/api/subject?subject=Javascript")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "subject": "Javascript", "chapters": [{ "title": "Basics", "topics": ["Variables", "Functions"] }] })
        );

        let (status, again) = send(router, get("/api/subject?subject=Javascript")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again, body);
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test]
    async fn subject_with_spaces_is_decoded() {
        let script = ScriptedProvider::with_text(&[JS_REPLY]);
        let (_tmp, _state, router) = router(&script);
        let (status, body) = send(router, get("/api/subject?subject=Maths%20CBSE%20Class%2010")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "Maths CBSE Class 10");
    }

    #[tokio::test]
    async fn missing_subject_is_400_with_field() {
        let script = ScriptedProvider::with_text(&[]);
        let (_tmp, _state, router) = router(&script);

        for uri in ["/api/subject", "/api/subject?subject="] {
            let (status, body) = send(router.clone(), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": { "for": "subject", "message": "Subject is required!" } }));
        }
        assert_eq!(script.calls(), 0);
    }

    #[tokio::test]
    async fn generator_failure_is_500_with_generic_message() {
        let script = ScriptedProvider::new([ScriptedReply::Fail("HTTP 401: bad key sk-live".into())]);
        let (_tmp, _state, router) = router(&script);

        let (status, body) = send(router, get("/api/subject?subject=X")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Something wrong with the generator! Please try again.");
        assert!(!body.to_string().contains("sk-live"));
    }

    #[tokio::test]
    async fn unparsable_syllabus_is_500() {
        let script = ScriptedProvider::with_text(&["I cannot help with that."]);
        let (_tmp, _state, router) = router(&script);
        let (status, body) = send(router, get("/api/subject?subject=X")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Error while parsing AI output! Try again.");
    }

    #[tokio::test]
    async fn content_endpoint_accepts_json_and_echoes_key() {
        let script = ScriptedProvider::with_text(&["# Variables\n\nNamed values."]);
        let (_tmp, state, router) = router(&script);
        seed(&state);

        let req = post_json(
            "/api/content",
            json!({ "subject": "Javascript", "chapter": "Basics", "topic": "Variables", "key": "Basics-Variables" }),
        );
        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "Javascript");
        assert_eq!(body["chapter"], "Basics");
        assert_eq!(body["topic"], "Variables");
        assert_eq!(body["key"], "Basics-Variables");
        assert!(body["content"].as_str().unwrap().contains("<h1>Variables</h1>"));
    }

    #[tokio::test]
    async fn content_endpoint_accepts_form_body() {
        let script = ScriptedProvider::with_text(&["plain"]);
        let (_tmp, state, router) = router(&script);
        seed(&state);

        let req = Request::post("/api/content")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("subject=Javascript&chapter=Basics&topic=Variables&key=Basics-Variables"))
            .unwrap();
        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "<p>plain</p>\n");
        assert_eq!(body["key"], "Basics-Variables");
    }

    #[tokio::test]
    async fn content_missing_fields_is_400_without_field() {
        let script = ScriptedProvider::with_text(&[]);
        let (_tmp, _state, router) = router(&script);

        let (status, body) = send(router, post_json("/api/content", json!({ "subject": "S" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": { "message": "Subject, chapter & topic are required!" } }));
    }

    #[tokio::test]
    async fn content_unknown_subject_is_404() {
        let script = ScriptedProvider::with_text(&["doc"]);
        let (_tmp, _state, router) = router(&script);
        let req = post_json("/api/content", json!({ "subject": "Ghost", "chapter": "C", "topic": "T" }));
        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Subject not found! Select the subject first.");
    }

    #[tokio::test]
    async fn malformed_json_body_is_400() {
        let script = ScriptedProvider::with_text(&[]);
        let (_tmp, _state, router) = router(&script);
        let req = Request::post("/api/content")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let script = ScriptedProvider::with_text(&[]);
        let (_tmp, state, router) = router(&script);
        seed(&state);

        let (status, body) = send(router, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "scripted");
        assert_eq!(body["subjects"], 1);
        assert_eq!(body["contents"], 0);
    }

    #[tokio::test]
    async fn root_serves_page_and_favicon_is_empty() {
        let script = ScriptedProvider::with_text(&[]);
        let (_tmp, _state, router) = router(&script);

        let resp = router.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8_lossy(&html);
        assert!(html.contains("/api/subject"));
        assert!(html.contains("/api/content"));

        let resp = router.oneshot(get("/favicon.ico")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
