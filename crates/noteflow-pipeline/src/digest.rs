//! Digest stage: the single classification-and-summary call behind
//! `/api/process`. Deliberately simpler than the staged pipelines.

use noteflow_core::{GenerationBackend, NoteDigest, Result};
use noteflow_inference::generate_structured;

pub const STAGE: &str = "digest";

/// Produce the persisted Note fields from acquired text in one model call.
pub async fn digest(backend: &dyn GenerationBackend, text: &str) -> Result<NoteDigest> {
    let instruction =
        "Summarize the content below for a study-notes app. Produce a short title, a two or \
         three sentence summary, the key points a student should retain, any concrete action \
         items, and up to four visual cards (icon emoji, short label, short value, hex color) \
         highlighting notable facts or figures.";

    let shape = serde_json::json!({
        "title": "short title",
        "summary": "two or three sentence summary",
        "keyPoints": ["key point"],
        "actionItems": ["action item"],
        "visualCards": [
            {"icon": "📊", "label": "short label", "value": "short value", "color": "#2d6a4f"}
        ]
    });

    generate_structured(backend, STAGE, instruction, &shape, text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteflow_core::Error;
    use noteflow_inference::MockGenerationBackend;

    #[tokio::test]
    async fn test_digest_parses_note_fields() {
        let backend = MockGenerationBackend::new().with_default_response(
            r##"{"title": "Photosynthesis",
                "summary": "Plants convert light into chemical energy.",
                "keyPoints": ["Light reactions produce ATP"],
                "actionItems": ["Review the Calvin cycle"],
                "visualCards": [{"icon": "🌱", "label": "Process", "value": "Light to sugar",
                                 "color": "#2d6a4f"}]}"##,
        );

        let digest = digest(&backend, "Photosynthesis converts light.").await.unwrap();
        assert_eq!(digest.title, "Photosynthesis");
        assert_eq!(digest.key_points.len(), 1);
        assert_eq!(digest.visual_cards[0].icon, "🌱");
    }

    #[tokio::test]
    async fn test_digest_failure_is_stage_tagged() {
        let backend = MockGenerationBackend::new().with_default_response("not json");
        let err = digest(&backend, "content").await.unwrap_err();
        assert!(matches!(err, Error::PipelineStage { ref stage, .. } if stage == STAGE));
    }
}
