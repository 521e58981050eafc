//! Transcription backend trait and Whisper implementation for audio-to-text.

use async_trait::async_trait;
use serde::Deserialize;

use noteflow_core::{defaults, Error, Result};

/// Result of audio transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// Full transcribed text.
    pub text: String,
    /// Detected language (ISO 639-1 code).
    pub language: Option<String>,
    /// Total audio duration in seconds.
    pub duration_secs: Option<f64>,
}

/// Backend for transcribing audio data.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe audio data.
    async fn transcribe(&self, audio_data: &[u8], mime_type: &str) -> Result<Transcript>;

    /// Check if the transcription backend is available.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible Whisper backend (works with Speaches/faster-whisper-server).
pub struct WhisperBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl WhisperBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
            timeout_secs: defaults::TRANSCRIBE_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables.
    /// Returns None if WHISPER_BASE_URL is not set.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var(defaults::ENV_WHISPER_BASE_URL).ok()?;
        if base_url.is_empty() {
            return None;
        }
        let model = std::env::var(defaults::ENV_WHISPER_MODEL)
            .unwrap_or_else(|_| defaults::DEFAULT_WHISPER_MODEL.to_string());
        Some(Self::new(base_url, model))
    }
}

/// OpenAI Whisper API response format.
#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// Map an audio MIME type to the extension the multipart filename carries.
fn audio_extension(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        _ => "wav",
    }
}

#[async_trait]
impl TranscriptionBackend for WhisperBackend {
    async fn transcribe(&self, audio_data: &[u8], mime_type: &str) -> Result<Transcript> {
        let url = format!("{}/v1/audio/transcriptions", self.base_url);

        let file_part = reqwest::multipart::Part::bytes(audio_data.to_vec())
            .file_name(format!("audio.{}", audio_extension(mime_type)))
            .mime_str(mime_type)
            .map_err(|e| Error::Transcription(format!("Failed to create multipart: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Transcription request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Whisper API returned {}: {}",
                status, body
            )));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            Error::Transcription(format!("Failed to parse whisper response: {}", e))
        })?;

        Ok(Transcript {
            text: result.text,
            language: result.language,
            duration_secs: result.duration,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_whisper_backend_new() {
        let backend =
            WhisperBackend::new("http://localhost:8000".to_string(), "whisper-1".to_string());
        assert_eq!(backend.base_url, "http://localhost:8000");
        assert_eq!(backend.model_name(), "whisper-1");
        assert_eq!(backend.timeout_secs, defaults::TRANSCRIBE_TIMEOUT_SECS);
    }

    #[test]
    fn test_audio_extension_mapping() {
        assert_eq!(audio_extension("audio/mpeg"), "mp3");
        assert_eq!(audio_extension("audio/mp3"), "mp3");
        assert_eq!(audio_extension("audio/wav"), "wav");
        assert_eq!(audio_extension("audio/x-m4a"), "m4a");
        assert_eq!(audio_extension("audio/unknown"), "wav");
    }

    #[test]
    fn test_whisper_response_deserialization_minimal() {
        let response: WhisperResponse = serde_json::from_str(r#"{"text": "Hello"}"#).unwrap();
        assert_eq!(response.text, "Hello");
        assert!(response.language.is_none());
        assert!(response.duration.is_none());
    }

    #[tokio::test]
    async fn test_transcribe_against_stub_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": "spoken words",
                "language": "en",
                "duration": 3.2
            })))
            .mount(&server)
            .await;

        let backend = WhisperBackend::new(server.uri(), "whisper-1".to_string());
        let transcript = backend.transcribe(b"fake-audio", "audio/wav").await.unwrap();
        assert_eq!(transcript.text, "spoken words");
        assert_eq!(transcript.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_transcribe_error_is_transcription_variant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let backend = WhisperBackend::new(server.uri(), "whisper-1".to_string());
        let err = backend.transcribe(b"fake-audio", "audio/wav").await.unwrap_err();
        assert!(matches!(err, Error::Transcription(_)));
        assert!(err.to_string().contains("401"));
    }
}
