//! Axum handlers for `/api/*` routes.

use axum::{
    Form, Json,
    extract::{FromRequest, Query, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::study::{ContentRequest, StudyError};

use super::AppState;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct SubjectQuery {
    subject: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build the `{ error: { for?, message } }` body.
fn json_error(field: Option<&str>, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    let mut error = json!({ "message": msg.to_string() });
    if let Some(field) = field {
        error["for"] = json!(field);
    }
    Json(json!({ "error": error }))
}

fn study_error_response(channel: &str, err: StudyError) -> Response {
    let status = match &err {
        StudyError::Validation { .. } => StatusCode::BAD_REQUEST,
        StudyError::UnknownSubject => StatusCode::NOT_FOUND,
        StudyError::Generation(_) | StudyError::Parse(_) | StudyError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let field = match &err {
        StudyError::Validation { field, .. } => *field,
        _ => None,
    };
    debug!(%channel, %status, error = %err, "request failed");
    (status, json_error(field, err)).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let store = state.study.store().clone();
    match tokio::task::spawn_blocking(move || store.counts()).await {
        Ok(Ok(counts)) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "app": &*state.app_name,
                "provider": state.study.provider_name(),
                "subjects": counts.subjects,
                "contents": counts.contents,
            })),
        )
            .into_response(),
        Ok(Err(e)) => {
            warn!(app = %state.app_name, "health store query failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, json_error(None, "store unavailable")).into_response()
        }
        Err(e) => {
            warn!(app = %state.app_name, "health task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /api/subject?subject=…
pub(super) async fn select_subject(
    State(state): State<AppState>,
    Query(query): Query<SubjectQuery>,
) -> Response {
    match state.study.select_subject(query.subject.as_deref()).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => study_error_response("select_subject", e),
    }
}

/// POST /api/content
///
/// Accepts a JSON body, or an urlencoded form when the content type is not JSON.
pub(super) async fn get_content(State(state): State<AppState>, req: Request) -> Response {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let parsed = if is_json {
        Json::<ContentRequest>::from_request(req, &state)
            .await
            .map(|Json(r)| r)
            .map_err(|rej| rej.body_text())
    } else {
        Form::<ContentRequest>::from_request(req, &state)
            .await
            .map(|Form(r)| r)
            .map_err(|rej| rej.body_text())
    };

    let content_req = match parsed {
        Ok(r) => r,
        Err(msg) => {
            warn!("rejected content request body: {msg}");
            return (StatusCode::BAD_REQUEST, json_error(None, msg)).into_response();
        }
    };

    match state.study.get_content(content_req).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => study_error_response("get_content", e),
    }
}
