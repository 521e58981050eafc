//! Structured logging field-name constants for noteflow.
//!
//! All crates use these constants so log aggregation tools can query by
//! standardized field names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request. Format: UUIDv7.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "acquire", "pipeline", "inference", "store"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "acquire", "generate", "render", "export_pdf"
pub const OPERATION: &str = "op";

/// Pipeline stage name for model-call stages.
/// Values: "classifier", "segmenter", "formatter", "layout", "diagram", "digest"
pub const STAGE: &str = "stage";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Content type of the inbound request.
pub const CONTENT_TYPE: &str = "content_type";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt sent to the model.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Byte length of acquired input text.
pub const INPUT_LEN: &str = "input_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
