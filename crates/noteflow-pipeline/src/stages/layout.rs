//! Layout Designer stage: absolute-positioned blocks plus page style.

use noteflow_core::{DesignedLayout, FormattedNotes, GenerationBackend, NoteGenOptions, Result};
use noteflow_inference::generate_structured;

pub const STAGE: &str = "layout";

/// Design a page layout for the formatted notes.
pub async fn design_layout(
    backend: &dyn GenerationBackend,
    formatted: &FormattedNotes,
    options: &NoteGenOptions,
) -> Result<DesignedLayout> {
    let instruction = format!(
        "You are a page-layout designer. Arrange the formatted study notes below on an A4 \
         portrait page (595 x 842 points). Requested style: {} look, {} color scheme, {} \
         visual density, {} fonts, {} complexity. Produce absolutely positioned blocks that \
         do not overlap, a page style with margins, three font roles and a four-color \
         palette. Block types: \"title\", \"heading\", \"paragraph\", \"bullet\", \"callout\".",
        options.pdf_style,
        options.color_scheme,
        options.visual_density,
        options.font_style,
        options.complexity_level,
    );

    let shape = serde_json::json!({
        "title": "document title",
        "theme": "theme name",
        "blocks": [
            {"type": "title", "content": "Document title",
             "position": {"x": 40.0, "y": 40.0, "width": 515.0, "height": 48.0},
             "style": {"fontFamily": "Georgia", "fontSize": 28.0,
                       "color": "#1b4332", "background": "transparent"}}
        ],
        "page": {
            "pageSize": "A4",
            "margins": 40.0,
            "headingFont": "Georgia",
            "bodyFont": "Helvetica",
            "accentFont": "Courier",
            "palette": ["#1b4332", "#2d6a4f", "#95d5b2", "#f8f9fa"]
        }
    });

    let payload = serde_json::to_string_pretty(formatted)?;
    generate_structured(backend, STAGE, &instruction, &shape, &payload).await
}
