//! Formatter stage: decorate segmented content with emoji, color and
//! highlight terms.

use noteflow_core::{Classification, FormattedNotes, GenerationBackend, Result, SegmentedContent};
use noteflow_inference::generate_structured;

pub const STAGE: &str = "formatter";

/// Decorate segmented content for visual presentation.
pub async fn format_notes(
    backend: &dyn GenerationBackend,
    segmented: &SegmentedContent,
    classification: &Classification,
) -> Result<FormattedNotes> {
    let instruction = format!(
        "You are a study-notes designer. Decorate the segmented {} content below for a \
         visually engaging study sheet: pick a fitting emoji for the document and for \
         individual sections where it helps, choose a color theme name, and mark the key \
         terms in each section that deserve highlighting. Keep every section's type and \
         content; only add decoration.",
        classification.subject,
    );

    let shape = serde_json::json!({
        "title": "document title",
        "emoji": "📘",
        "colorTheme": "theme name, e.g. green",
        "sections": [
            {"type": "heading", "content": "Section heading", "level": 2},
            {"type": "bullet", "content": "One key point", "emoji": "💡",
             "color": "#2d6a4f", "highlightTerms": ["key term"]}
        ]
    });

    let payload = serde_json::to_string_pretty(segmented)?;
    generate_structured(backend, STAGE, &instruction, &shape, &payload).await
}
