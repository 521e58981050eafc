//! Note CRUD and per-note PDF download.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::Json;
use uuid::Uuid;

use noteflow_core::{Note, NoteGenOptions};
use noteflow_pipeline::{PdfExporter, StudyNoteEngine};

use crate::{ApiError, AppState};

/// Any id that does not parse as a UUID is simply a note that does not
/// exist; the route contract is a plain 404 either way.
fn parse_note_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound("Note not found".to_string()))
}

pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.notes.list().await?))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.notes.fetch(id).await?))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_note_id(&id)?;
    state.notes.delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Regenerate study notes from the stored note's original content and
/// stream the PDF.
pub async fn download_note_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(HeaderMap, Vec<u8>), ApiError> {
    let id = parse_note_id(&id)?;
    let note = state.notes.fetch(id).await?;

    let engine = StudyNoteEngine::new(state.backend.clone(), state.cache.clone());
    let output = engine
        .run(&note.original_text, &NoteGenOptions::default())
        .await?;

    let exporter = PdfExporter::discover().await?;
    let pdf = exporter.render(&output.html).await?;

    Ok((pdf_headers(&output.filename)?, pdf))
}

/// Content-Disposition with an RFC 5987 encoded filename, plus a plain
/// ASCII fallback.
pub(crate) fn pdf_headers(filename: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    let disposition = format!(
        "attachment; filename=\"notes.pdf\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| ApiError::Internal(format!("invalid filename header: {}", e)))?,
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_id_rejects_non_uuid() {
        let err = parse_note_id("does-not-exist").unwrap_err();
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Note not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(parse_note_id(&Uuid::nil().to_string()).is_ok());
    }

    #[test]
    fn test_pdf_headers_encode_filename() {
        let headers = pdf_headers("caféine_study_notes.pdf").unwrap();
        let disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.contains("filename*=UTF-8''caf%C3%A9ine_study_notes.pdf"));
        assert!(disposition.starts_with("attachment;"));
    }
}
