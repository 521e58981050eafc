//! Generate endpoints: the legacy five-stage pipeline and the advanced
//! engine, each answering with a PDF download or a JSON payload depending
//! on the `generatePDF` option.

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use noteflow_pipeline::{AdvancedEngine, PdfExporter, StudyNoteEngine};

use crate::handlers::{acquire_request, notes::pdf_headers};
use crate::{ApiError, AppState};

pub async fn generate_study_notes(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, ApiError> {
    let (acquired, options) = acquire_request(&state, req).await?;

    let engine = StudyNoteEngine::new(state.backend.clone(), state.cache.clone());
    let output = engine.run(&acquired.text, &options).await?;

    if options.generate_pdf {
        let exporter = PdfExporter::discover().await?;
        let pdf = exporter.render(&output.html).await?;
        return Ok((pdf_headers(&output.filename)?, pdf).into_response());
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "html": output.html,
        "filename": output.filename,
        "message": format!("Study notes generated for '{}'", output.title),
    }))
    .into_response())
}

pub async fn generate_advanced_notes(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, ApiError> {
    let (acquired, options) = acquire_request(&state, req).await?;

    let engine = AdvancedEngine::new(state.backend.clone(), state.cache.clone());
    let output = engine.run(&acquired.text, &options).await?;

    if options.generate_pdf {
        let exporter = PdfExporter::discover().await?;
        let pdf = exporter.render(&output.html).await?;
        return Ok((pdf_headers(&output.filename)?, pdf).into_response());
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "html": output.html,
        "filename": output.filename,
        "message": format!(
            "Advanced study notes generated for '{}' ({} diagrams)",
            output.title, output.diagram_count
        ),
        "processingMetrics": output.metrics,
        "pipeline": AdvancedEngine::pipeline_description(),
    }))
    .into_response())
}
