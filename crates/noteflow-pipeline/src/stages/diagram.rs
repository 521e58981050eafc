//! Diagram Generator: Mermaid diagrams for the advanced engine.
//!
//! The one stage with graceful degradation: a remote failure or a shape
//! mismatch yields an empty diagram list instead of aborting the pipeline.

use serde::Deserialize;
use tracing::warn;

use noteflow_core::{Diagram, GenerationBackend, Result, SegmentedContent};
use noteflow_inference::generate_structured;

pub const STAGE: &str = "diagram";

#[derive(Deserialize)]
struct DiagramList {
    diagrams: Vec<Diagram>,
}

/// Generate Mermaid diagrams for the segmented content. Flag off short-
/// circuits without a model call; failure degrades to no diagrams.
pub async fn generate_diagrams(
    backend: &dyn GenerationBackend,
    segmented: &SegmentedContent,
    include: bool,
) -> Result<Vec<Diagram>> {
    if !include {
        return Ok(Vec::new());
    }

    let instruction =
        "You are a diagram author. Where the study content below contains a process, cycle, \
         hierarchy, sequence of events, or a central concept with branches, produce Mermaid \
         diagram code for it. Diagram types: \"flowchart\", \"cycle\", \"hierarchy\", \
         \"timeline\", \"mindmap\". Produce at most three diagrams; none is acceptable.";

    let shape = serde_json::json!({
        "diagrams": [
            {"type": "flowchart", "title": "Process overview",
             "mermaid": "flowchart TD\n  A[Start] --> B[End]"}
        ]
    });

    let payload = serde_json::to_string_pretty(segmented)?;
    match generate_structured::<DiagramList>(backend, STAGE, instruction, &shape, &payload).await {
        Ok(list) => Ok(list.diagrams),
        Err(e) => {
            warn!(error = %e, "diagram generation failed, continuing without diagrams");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteflow_inference::MockGenerationBackend;

    fn segmented() -> SegmentedContent {
        SegmentedContent {
            title: "Water Cycle".to_string(),
            sections: vec![],
        }
    }

    #[tokio::test]
    async fn test_flag_off_short_circuits() {
        let backend = MockGenerationBackend::new();
        let diagrams = generate_diagrams(&backend, &segmented(), false).await.unwrap();
        assert!(diagrams.is_empty());
        assert_eq!(backend.call_count(), 0, "no model call when flag is off");
    }

    #[tokio::test]
    async fn test_diagrams_parsed_when_flag_on() {
        let backend = MockGenerationBackend::new().with_default_response(
            r#"{"diagrams": [{"type": "cycle", "title": "Water cycle",
                              "mermaid": "flowchart TD\n A --> B"}]}"#,
        );
        let diagrams = generate_diagrams(&backend, &segmented(), true).await.unwrap();
        assert_eq!(diagrams.len(), 1);
        assert_eq!(diagrams[0].diagram_type, "cycle");
    }

    #[tokio::test]
    async fn test_remote_failure_degrades_to_empty() {
        let backend = MockGenerationBackend::new().with_failure_rate(1.0);
        let diagrams = generate_diagrams(&backend, &segmented(), true).await.unwrap();
        assert!(diagrams.is_empty());
    }

    #[tokio::test]
    async fn test_shape_mismatch_degrades_to_empty() {
        let backend = MockGenerationBackend::new().with_default_response("not json at all");
        let diagrams = generate_diagrams(&backend, &segmented(), true).await.unwrap();
        assert!(diagrams.is_empty());
    }
}
