//! # noteflow-api
//!
//! Axum HTTP server exposing the note-generation pipeline under `/api/`.
//!
//! [`build_router`] wires handlers to an [`AppState`]; `main.rs` adds the
//! environment-driven outer layers (CORS allow-list, body limit) and serves.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use noteflow_acquire::Acquirer;
use noteflow_core::{GenerationBackend, NoteRepository};
use noteflow_store::LearningCache;

pub mod handlers;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Shared application state. Every field is cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteRepository>,
    pub cache: Arc<LearningCache>,
    pub backend: Arc<dyn GenerationBackend>,
    pub acquirer: Arc<Acquirer>,
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

/// Route-level error: a core error plus the status code it maps to.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<noteflow_core::Error> for ApiError {
    fn from(err: noteflow_core::Error) -> Self {
        use noteflow_core::Error;
        match &err {
            Error::UnsupportedInput(_)
            | Error::Extraction(_)
            | Error::Transcription(_)
            | Error::Validation(_) => ApiError::BadRequest(err.to_string()),
            Error::NoteNotFound(_) | Error::NotFound(_) => ApiError::NotFound(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the API router. Outer environment-driven layers (CORS, body
/// limit) are added by the binary; tests drive this router directly.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/notes", get(handlers::notes::list_notes))
        .route(
            "/api/notes/:id",
            get(handlers::notes::get_note).delete(handlers::notes::delete_note),
        )
        .route(
            "/api/notes/:id/download-pdf",
            get(handlers::notes::download_note_pdf),
        )
        .route("/api/process", post(handlers::process::process_content))
        .route(
            "/api/generate-study-notes",
            post(handlers::generate::generate_study_notes),
        )
        .route(
            "/api/generate-advanced-notes",
            post(handlers::generate::generate_advanced_notes),
        )
        .route(
            "/api/notegen-feedback",
            post(handlers::feedback::submit_feedback),
        )
        .route(
            "/api/notegen-analytics",
            get(handlers::feedback::analytics),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_status_mapping() {
        use noteflow_core::Error;

        let bad: ApiError = Error::UnsupportedInput("ext".into()).into();
        assert!(matches!(bad, ApiError::BadRequest(_)));

        let bad: ApiError = Error::Validation("rating".into()).into();
        assert!(matches!(bad, ApiError::BadRequest(_)));

        let missing: ApiError = Error::NoteNotFound(Uuid::nil()).into();
        match missing {
            ApiError::NotFound(msg) => assert_eq!(msg, "Note not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }

        let internal: ApiError = Error::stage("layout", "boom").into();
        assert!(matches!(internal, ApiError::Internal(_)));

        let internal: ApiError = Error::PdfRender("crash".into()).into();
        assert!(matches!(internal, ApiError::Internal(_)));
    }
}
