//! Centralized default constants for noteflow.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama-compatible base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model name.
pub const GEN_MODEL: &str = "gpt-oss:20b";

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Environment variable for the generation backend base URL.
pub const ENV_OLLAMA_URL: &str = "OLLAMA_URL";

/// Environment variable for the generation model name.
pub const ENV_GEN_MODEL: &str = "GEN_MODEL";

/// Environment variable overriding the generation timeout.
pub const ENV_GEN_TIMEOUT_SECS: &str = "NOTEFLOW_GEN_TIMEOUT_SECS";

// =============================================================================
// TRANSCRIPTION
// =============================================================================

/// Environment variable for the Whisper transcription server URL.
pub const ENV_WHISPER_BASE_URL: &str = "WHISPER_BASE_URL";

/// Default Whisper transcription server URL.
pub const DEFAULT_WHISPER_BASE_URL: &str = "http://localhost:8000";

/// Environment variable for the Whisper model name.
pub const ENV_WHISPER_MODEL: &str = "WHISPER_MODEL";

/// Default Whisper model.
pub const DEFAULT_WHISPER_MODEL: &str = "Systran/faster-distil-whisper-large-v3";

/// Timeout for transcription requests in seconds (long audio).
pub const TRANSCRIBE_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// CONTENT ACQUISITION
// =============================================================================

/// Per-command timeout for external extraction tools (seconds).
pub const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 60;

/// Maximum audio duration extracted from a video before transcription
/// (seconds). Bounds the degraded no-captions path.
pub const VIDEO_AUDIO_MAX_SECS: u64 = 600;

/// Caption/subtitle language requested from video sources.
pub const CAPTION_LANGUAGE: &str = "en";

/// Environment variable overriding the caption language.
pub const ENV_CAPTION_LANGUAGE: &str = "NOTEFLOW_CAPTION_LANGUAGE";

// =============================================================================
// PDF EXPORT
// =============================================================================

/// Timeout for the headless-browser print step in seconds.
pub const PDF_RENDER_TIMEOUT_SECS: u64 = 60;

/// Environment variable for an explicit browser binary path.
pub const ENV_BROWSER_PATH: &str = "NOTEFLOW_BROWSER_PATH";

/// Browser binaries probed, in order, when no explicit path is configured.
pub const BROWSER_CANDIDATES: &[&str] = &["chromium", "chromium-browser", "google-chrome"];

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Environment variable for the HTTP server port.
pub const ENV_SERVER_PORT: &str = "NOTEFLOW_PORT";

/// Maximum request body size in bytes (50 MB uploads).
pub const MAX_BODY_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Environment variable holding the comma-separated CORS origin allow-list.
pub const ENV_CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";

// =============================================================================
// LEARNING CACHE
// =============================================================================

/// Default learning-cache file path (process working directory).
pub const CACHE_FILE: &str = "noteflow-learning.json";

/// Environment variable for the learning-cache file path.
pub const ENV_CACHE_FILE: &str = "NOTEFLOW_CACHE_FILE";

/// Identifier for the single preference-history user.
pub const DEFAULT_USER_ID: &str = "default";

/// Capacity bound for the classification mapping.
pub const CACHE_MAX_CLASSIFICATIONS: usize = 512;

/// Capacity bound for the design-template mapping.
pub const CACHE_MAX_TEMPLATES: usize = 256;

/// Capacity bound for the performance-metric mapping.
pub const CACHE_MAX_METRICS: usize = 1024;

// =============================================================================
// FEEDBACK
// =============================================================================

/// Inclusive rating bounds for feedback submissions.
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 10.0;

// =============================================================================
// RENDERER
// =============================================================================

/// Heading-level inference thresholds, in characters of content. Short
/// headings get the larger/shallower level. Documented contract: content
/// length is the only available signal (see render module).
pub const HEADING_H2_MAX_CHARS: usize = 40;
pub const HEADING_H3_MAX_CHARS: usize = 80;

/// Cap for the advanced engine's coarse output-quality score.
pub const QUALITY_SCORE_MAX: f64 = 10.0;

/// Suffix appended to generated note filenames.
pub const NOTE_FILENAME_SUFFIX: &str = "_study_notes.pdf";

// =============================================================================
// ENVIRONMENT OVERRIDES
// =============================================================================

/// Read a parseable override from the environment. An unset variable keeps
/// the default; an unparseable value warns and keeps the default.
pub fn env_override<T: std::str::FromStr>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(var, value = %val, "invalid override, using default");
                default
            }
        },
        Err(_) => default,
    }
}
