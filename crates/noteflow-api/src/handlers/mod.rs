//! Route handlers, grouped by surface area.

pub mod feedback;
pub mod generate;
pub mod notes;
pub mod process;

use axum::extract::{FromRequest, Multipart, Request};
use axum::Json;
use serde::Deserialize;

use noteflow_core::{AcquiredContent, ContentType, Error};

use crate::{ApiError, AppState};

/// JSON body shape shared by `/api/process` and the generate endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentBody {
    pub content: Option<String>,
    pub content_type: Option<ContentType>,
    pub file_name: Option<String>,
    #[serde(default)]
    pub options: Option<noteflow_core::NoteGenOptions>,
}

/// Extract content from either a multipart upload (`file` field, optional
/// `options` field) or a JSON body, and run it through the Acquirer.
///
/// Returns the acquired content plus any options carried in the request.
pub(crate) async fn acquire_request(
    state: &AppState,
    req: Request,
) -> Result<(AcquiredContent, noteflow_core::NoteGenOptions), ApiError> {
    let is_multipart = req
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?;

        let mut upload: Option<(Vec<u8>, String)> = None;
        let mut options = noteflow_core::NoteGenOptions::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid multipart field: {}", e)))?
        {
            match field.name() {
                Some("file") => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("unreadable upload: {}", e)))?;
                    upload = Some((data.to_vec(), file_name));
                }
                Some("options") => {
                    let raw = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("unreadable options: {}", e)))?;
                    options = serde_json::from_str(&raw)
                        .map_err(|e| ApiError::BadRequest(format!("invalid options: {}", e)))?;
                }
                _ => {}
            }
        }

        let (data, file_name) = upload
            .ok_or_else(|| ApiError::BadRequest("missing 'file' field in upload".to_string()))?;
        let acquired = state.acquirer.acquire_upload(&data, &file_name).await?;
        return Ok((acquired, options));
    }

    let Json(body) = Json::<ContentBody>::from_request(req, &())
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))?;

    let content = body
        .content
        .as_deref()
        .ok_or_else(|| ApiError::from(Error::UnsupportedInput("missing content".to_string())))?;

    // Declared type wins; a file name infers it; bare content is text.
    let content_type = match (body.content_type, body.file_name.as_deref()) {
        (Some(ct), _) => ct,
        (None, Some(name)) => noteflow_acquire::content_type_for_filename(name).ok_or_else(|| {
            ApiError::from(Error::UnsupportedInput(format!(
                "unrecognized file extension for '{}'",
                name
            )))
        })?,
        (None, None) => ContentType::Text,
    };

    let acquired = state.acquirer.acquire_body(content, content_type).await?;
    Ok((acquired, body.options.unwrap_or_default()))
}
