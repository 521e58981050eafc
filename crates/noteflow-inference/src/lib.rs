//! # noteflow-inference
//!
//! Generation and transcription backend abstraction for noteflow.
//!
//! This crate provides:
//! - Ollama-compatible generation backend (JSON-constrained by default)
//! - Structured-JSON helper: one model call, typed serde-validated result
//! - Whisper transcription backend for audio-to-text
//! - Deterministic mock backend (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use noteflow_inference::OllamaBackend;
//! use noteflow_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OllamaBackend::from_env();
//!     let text = backend.generate("Summarize: ...").await.unwrap();
//! }
//! ```

pub mod ollama;
pub mod structured;
pub mod transcription;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use ollama::OllamaBackend;
pub use structured::{generate_structured, parse_structured};
pub use transcription::{Transcript, TranscriptionBackend, WhisperBackend};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerationBackend;
