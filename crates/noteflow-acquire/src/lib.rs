//! # noteflow-acquire
//!
//! Content acquisition: normalize an inbound request into a single plain-text
//! string plus a content-type tag.
//!
//! Two entry shapes exist:
//! - an uploaded binary with a filename (content type inferred from the
//!   extension)
//! - a JSON body carrying `content` and a declared `contentType`
//!
//! Dispatch happens before any external tool or service is touched: an
//! unrecognized extension or missing content fails with
//! [`Error::UnsupportedInput`] without invoking extraction or transcription.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use noteflow_core::{AcquiredContent, ContentType, Error, Result};
use noteflow_inference::TranscriptionBackend;

pub mod audio_transcribe;
pub mod pdf_text;
pub mod text_native;
pub mod video_url;

pub use video_url::VideoUrlExtractor;

/// Map a filename extension to the acquisition path that handles it.
///
/// Returns None for extensions no path claims; callers turn that into
/// `UnsupportedInput`.
pub fn content_type_for_filename(file_name: &str) -> Option<ContentType> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();

    match ext.as_str() {
        "txt" | "md" | "markdown" => Some(ContentType::Text),
        "pdf" => Some(ContentType::Pdf),
        "mp3" | "wav" | "m4a" | "ogg" | "flac" => Some(ContentType::Audio),
        _ => None,
    }
}

/// MIME type forwarded to the transcription service for an audio extension.
fn audio_mime_for_filename(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "audio/wav",
    }
}

/// Front door for all inbound content.
///
/// Holds the optional transcription backend (audio uploads and the
/// no-captions video fallback need it) and the video-URL extractor.
pub struct Acquirer {
    transcription: Option<Arc<dyn TranscriptionBackend>>,
    video: VideoUrlExtractor,
}

impl Acquirer {
    pub fn new(transcription: Option<Arc<dyn TranscriptionBackend>>) -> Self {
        let video = VideoUrlExtractor::new(transcription.clone());
        Self {
            transcription,
            video,
        }
    }

    /// Create from environment variables. Transcription is optional; without
    /// it, audio uploads fail with a configuration hint and the video path
    /// skips straight from captions to the placeholder fallback.
    pub fn from_env() -> Self {
        use noteflow_inference::WhisperBackend;

        let transcription =
            WhisperBackend::from_env().map(|b| Arc::new(b) as Arc<dyn TranscriptionBackend>);
        if transcription.is_none() {
            info!("no transcription backend configured, audio uploads will be rejected");
        }
        Self::new(transcription)
    }

    /// Acquire from an uploaded binary. The extension decides the path.
    pub async fn acquire_upload(&self, data: &[u8], file_name: &str) -> Result<AcquiredContent> {
        let content_type = content_type_for_filename(file_name).ok_or_else(|| {
            Error::UnsupportedInput(format!(
                "unrecognized file extension for '{}' (supported: .txt .md .pdf .mp3 .wav .m4a)",
                file_name
            ))
        })?;

        debug!(
            content_type = %content_type,
            input_len = data.len(),
            file_name,
            "acquiring uploaded content"
        );

        let text = match content_type {
            ContentType::Text => text_native::extract(data)?,
            ContentType::Pdf => pdf_text::extract(data, file_name).await?,
            ContentType::Audio => {
                let backend = self.transcription.as_deref().ok_or_else(|| {
                    Error::Transcription(
                        "no transcription backend configured (set WHISPER_BASE_URL)".to_string(),
                    )
                })?;
                audio_transcribe::extract(backend, data, audio_mime_for_filename(file_name)).await?
            }
            // Video arrives as a URL in a JSON body, never as an upload.
            ContentType::VideoUrl => {
                return Err(Error::UnsupportedInput(
                    "video content must be submitted as a URL".to_string(),
                ))
            }
        };

        Ok(AcquiredContent { text, content_type })
    }

    /// Acquire from a JSON body with a declared content type.
    ///
    /// Text passes through as-is; a video URL runs the caption/transcription
    /// extractor. Binary types cannot ride in a JSON string and are rejected
    /// up front.
    pub async fn acquire_body(
        &self,
        content: &str,
        content_type: ContentType,
    ) -> Result<AcquiredContent> {
        if content.trim().is_empty() {
            return Err(Error::UnsupportedInput("missing content".to_string()));
        }

        debug!(
            content_type = %content_type,
            input_len = content.len(),
            "acquiring body content"
        );

        let text = match content_type {
            ContentType::Text => content.to_string(),
            ContentType::VideoUrl => self.video.extract(content).await?,
            ContentType::Pdf | ContentType::Audio => {
                return Err(Error::UnsupportedInput(format!(
                    "content type '{}' requires a file upload",
                    content_type
                )))
            }
        };

        Ok(AcquiredContent { text, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use noteflow_inference::Transcript;

    struct StubTranscription {
        text: &'static str,
    }

    #[async_trait]
    impl TranscriptionBackend for StubTranscription {
        async fn transcribe(&self, _audio_data: &[u8], _mime_type: &str) -> Result<Transcript> {
            Ok(Transcript {
                text: self.text.to_string(),
                language: Some("en".to_string()),
                duration_secs: Some(1.0),
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn test_extension_dispatch() {
        assert_eq!(
            content_type_for_filename("notes.txt"),
            Some(ContentType::Text)
        );
        assert_eq!(
            content_type_for_filename("REPORT.PDF"),
            Some(ContentType::Pdf)
        );
        assert_eq!(
            content_type_for_filename("lecture.mp3"),
            Some(ContentType::Audio)
        );
        assert_eq!(content_type_for_filename("talk.m4a"), Some(ContentType::Audio));
        assert_eq!(content_type_for_filename("slides.docx"), None);
        assert_eq!(content_type_for_filename("no_extension"), None);
    }

    #[test]
    fn test_audio_mime_mapping() {
        assert_eq!(audio_mime_for_filename("a.mp3"), "audio/mpeg");
        assert_eq!(audio_mime_for_filename("a.wav"), "audio/wav");
        assert_eq!(audio_mime_for_filename("a.m4a"), "audio/mp4");
        assert_eq!(audio_mime_for_filename("weird.bin"), "audio/wav");
    }

    #[tokio::test]
    async fn test_upload_unsupported_extension_never_extracts() {
        let acquirer = Acquirer::new(None);
        let err = acquirer
            .acquire_upload(b"whatever", "deck.pptx")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
        assert!(err.to_string().contains("pptx") || err.to_string().contains("deck"));
    }

    #[tokio::test]
    async fn test_upload_text_passthrough() {
        let acquirer = Acquirer::new(None);
        let acquired = acquirer
            .acquire_upload("line one\nline two".as_bytes(), "notes.txt")
            .await
            .unwrap();
        assert_eq!(acquired.content_type, ContentType::Text);
        assert_eq!(acquired.text, "line one\nline two");
    }

    #[tokio::test]
    async fn test_upload_audio_without_backend_is_transcription_error() {
        let acquirer = Acquirer::new(None);
        let err = acquirer
            .acquire_upload(b"fake-audio", "lecture.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transcription(_)));
        assert!(err.to_string().contains("WHISPER_BASE_URL"));
    }

    #[tokio::test]
    async fn test_upload_audio_with_backend() {
        let acquirer = Acquirer::new(Some(Arc::new(StubTranscription {
            text: "spoken words",
        })));
        let acquired = acquirer
            .acquire_upload(b"fake-audio", "lecture.wav")
            .await
            .unwrap();
        assert_eq!(acquired.content_type, ContentType::Audio);
        assert_eq!(acquired.text, "spoken words");
    }

    #[tokio::test]
    async fn test_body_text_passthrough() {
        let acquirer = Acquirer::new(None);
        let acquired = acquirer
            .acquire_body("plain text content", ContentType::Text)
            .await
            .unwrap();
        assert_eq!(acquired.content_type, ContentType::Text);
        assert_eq!(acquired.text, "plain text content");
    }

    #[tokio::test]
    async fn test_body_missing_content_is_unsupported() {
        let acquirer = Acquirer::new(None);
        let err = acquirer
            .acquire_body("   ", ContentType::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }

    #[tokio::test]
    async fn test_body_binary_types_rejected() {
        let acquirer = Acquirer::new(None);
        let err = acquirer
            .acquire_body("%PDF-1.4 ...", ContentType::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }

    #[tokio::test]
    async fn test_video_upload_rejected() {
        let acquirer = Acquirer::new(None);
        let err = acquirer
            .acquire_upload(b"bytes", "clip.txt.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }
}
