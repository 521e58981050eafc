//! Error types for noteflow.

use thiserror::Error;

/// Result type alias using noteflow's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for noteflow operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Unrecognized file extension or missing content
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// External text extraction failed (PDF, captions)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Audio transcription failed
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// A model-call stage failed (remote error or JSON shape mismatch)
    #[error("Pipeline stage '{stage}' failed: {message}")]
    PipelineStage { stage: String, message: String },

    /// Headless-browser PDF rendering failed
    #[error("PDF render error: {0}")]
    PdfRender(String),

    /// Malformed request payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// Note not found
    #[error("Note not found")]
    NoteNotFound(uuid::Uuid),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Tag an error with the pipeline stage it occurred in, appending the
    /// original message.
    pub fn stage(stage: &str, err: impl std::fmt::Display) -> Self {
        Error::PipelineStage {
            stage: stage.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
