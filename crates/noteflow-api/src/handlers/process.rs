//! `/api/process`: acquire content, run the digest call, persist a Note.

use axum::extract::{Request, State};
use axum::Json;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use noteflow_core::{Note, ProcessingStatus};
use noteflow_pipeline::digest;

use crate::handlers::acquire_request;
use crate::{ApiError, AppState};

pub async fn process_content(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<Note>, ApiError> {
    let (acquired, _options) = acquire_request(&state, req).await?;

    let digest = digest(state.backend.as_ref(), &acquired.text).await?;

    let note = Note {
        id: Uuid::now_v7(),
        title: digest.title,
        summary: digest.summary,
        key_points: digest.key_points,
        action_items: digest.action_items,
        visual_cards: digest.visual_cards,
        original_text: acquired.text,
        content_type: acquired.content_type,
        processing_status: ProcessingStatus::Completed,
        created_at: Utc::now(),
    };

    info!(
        note_id = %note.id,
        content_type = %note.content_type,
        title = %note.title,
        "note processed"
    );

    state.notes.insert(note.clone()).await?;
    Ok(Json(note))
}
