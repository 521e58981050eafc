//! Audio acquisition: transcribe uploaded audio via the configured backend.

use tracing::debug;

use noteflow_core::{Error, Result};
use noteflow_inference::TranscriptionBackend;

/// Transcribe uploaded audio bytes into text.
///
/// Any backend failure surfaces as [`Error::Transcription`] so the API layer
/// can report it as a client-visible input problem rather than a server
/// fault.
pub async fn extract(
    backend: &dyn TranscriptionBackend,
    data: &[u8],
    mime_type: &str,
) -> Result<String> {
    if data.is_empty() {
        return Err(Error::UnsupportedInput("missing content".to_string()));
    }

    let transcript = backend.transcribe(data, mime_type).await?;

    debug!(
        model = backend.model_name(),
        input_len = data.len(),
        response_len = transcript.text.len(),
        language = transcript.language.as_deref().unwrap_or("unknown"),
        "audio transcribed"
    );

    if transcript.text.trim().is_empty() {
        return Err(Error::Transcription(
            "transcription produced no text (silent or unreadable audio)".to_string(),
        ));
    }

    Ok(transcript.text)
}
