//! Segmenter stage: break classified content into typed sections.

use noteflow_core::{Classification, GenerationBackend, Result, SegmentedContent};
use noteflow_inference::generate_structured;

pub const STAGE: &str = "segmenter";

/// Segment content into a titled sequence of typed sections, informed by
/// the classifier's output.
pub async fn segment(
    backend: &dyn GenerationBackend,
    text: &str,
    classification: &Classification,
) -> Result<SegmentedContent> {
    let instruction = format!(
        "You are an expert at structuring study material. The content below is {} material \
         on the subject of {}, written in a {} tone. Break it into an ordered sequence of \
         sections. Valid section types: \"heading\", \"bullet\", \"definition\", \"example\", \
         \"formula\", \"callout\". Give the document a concise title. Headings may carry a \
         \"level\" (2-4); any section may carry a short \"style\" hint.",
        classification.difficulty_label(),
        classification.subject,
        classification.tone,
    );

    let shape = serde_json::json!({
        "title": "document title",
        "sections": [
            {"type": "heading", "content": "Section heading", "level": 2},
            {"type": "bullet", "content": "One key point"},
            {"type": "definition", "content": "Term: its definition"}
        ]
    });

    generate_structured(backend, STAGE, &instruction, &shape, text).await
}

/// Small display helper kept off the core model.
trait DifficultyLabel {
    fn difficulty_label(&self) -> &'static str;
}

impl DifficultyLabel for Classification {
    fn difficulty_label(&self) -> &'static str {
        use noteflow_core::Difficulty;
        match self.difficulty {
            Difficulty::Beginner => "beginner-level",
            Difficulty::Intermediate => "intermediate-level",
            Difficulty::Advanced => "advanced-level",
        }
    }
}
