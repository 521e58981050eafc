//! Classifier stage: subject, tone, language, tags and difficulty.

use noteflow_core::{Classification, GenerationBackend, Result};
use noteflow_inference::generate_structured;

pub const STAGE: &str = "classifier";

/// Classify raw content. First stage of both pipeline variants.
pub async fn classify(backend: &dyn GenerationBackend, text: &str) -> Result<Classification> {
    let instruction = "You are an expert content analyst. Classify the study material below: \
                       identify its subject area, the tone of the writing, the language it is \
                       written in, a handful of topical tags, and the difficulty level for a \
                       student (one of \"beginner\", \"intermediate\", \"advanced\").";

    let shape = serde_json::json!({
        "subject": "subject area, e.g. biology",
        "tone": "tone of the writing, e.g. academic",
        "language": "ISO language name, e.g. English",
        "tags": ["topical", "tags"],
        "difficulty": "beginner | intermediate | advanced"
    });

    generate_structured(backend, STAGE, instruction, &shape, text).await
}
