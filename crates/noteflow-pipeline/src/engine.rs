//! Pipeline engines.
//!
//! [`StudyNoteEngine`] is the five-stage flow behind
//! `/api/generate-study-notes`: classify, segment, format, design layout,
//! render. [`AdvancedEngine`] runs the same model-call stages plus diagram
//! generation, and records per-stage timings and a coarse quality score as
//! write-only telemetry.
//!
//! Stages run strictly sequentially; any stage failure aborts the run with
//! a stage-tagged error. Only diagram generation degrades instead.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::info;

use noteflow_core::defaults::{NOTE_FILENAME_SUFFIX, QUALITY_SCORE_MAX};
use noteflow_core::{
    Classification, DesignTemplate, DesignedLayout, Diagram, FormattedNotes, GenerationBackend,
    NoteGenOptions, PerformanceMetric, ProcessingMetrics, Result, StageTiming,
};
use noteflow_store::LearningCache;

use crate::render::render_html;
use crate::stages;

/// Output of a legacy pipeline run.
#[derive(Debug)]
pub struct NoteGenOutput {
    pub title: String,
    pub html: String,
    pub filename: String,
}

/// Output of an advanced pipeline run.
pub struct AdvancedOutput {
    pub title: String,
    pub html: String,
    pub filename: String,
    pub diagram_count: usize,
    pub metrics: ProcessingMetrics,
}

/// Key for the classification mapping: a normalized prefix of the content.
/// Repeated submissions of the same material reuse the cached result.
fn pattern_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .take(80)
        .collect()
}

/// Downloadable filename from a note title: alphanumerics kept, everything
/// else collapsed to single underscores.
pub fn note_filename(title: &str) -> String {
    let mut sanitized = String::with_capacity(title.len());
    let mut last_was_sep = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            sanitized.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            sanitized.push('_');
            last_was_sep = true;
        }
    }
    let sanitized = sanitized.trim_end_matches('_');
    if sanitized.is_empty() {
        format!("notes{}", NOTE_FILENAME_SUFFIX)
    } else {
        format!("{}{}", sanitized, NOTE_FILENAME_SUFFIX)
    }
}

/// Coarse output-quality heuristic: a quarter of the maximum for each of
/// non-empty headings, bullets, diagrams and paragraph blocks.
fn quality_score(
    formatted: &FormattedNotes,
    layout: &DesignedLayout,
    diagrams: &[Diagram],
) -> f64 {
    use noteflow_core::SectionType;

    let point = QUALITY_SCORE_MAX / 4.0;
    let mut score = 0.0;

    let has = |kind: SectionType| {
        formatted
            .sections
            .iter()
            .any(|s| s.section_type == kind && !s.content.trim().is_empty())
    };

    if has(SectionType::Heading) {
        score += point;
    }
    if has(SectionType::Bullet) {
        score += point;
    }
    if !diagrams.is_empty() {
        score += point;
    }
    if layout
        .blocks
        .iter()
        .any(|b| b.block_type == "paragraph" && !b.content.trim().is_empty())
    {
        score += point;
    }

    score.min(QUALITY_SCORE_MAX)
}

/// Classify with a cache in front: a pattern hit skips the model call.
async fn classify_cached(
    backend: &dyn GenerationBackend,
    cache: &LearningCache,
    text: &str,
) -> Result<Classification> {
    let key = pattern_key(text);
    if let Some(hit) = cache.lookup_classification(&key).await {
        info!(subject = %hit.subject, "classification cache hit");
        return Ok(hit);
    }
    let classification = stages::classify(backend, text).await?;
    cache.record_classification(key, classification.clone()).await;
    Ok(classification)
}

/// Remember the design combination used for this run.
async fn record_design(
    cache: &LearningCache,
    classification: &Classification,
    options: &NoteGenOptions,
    success_score: f64,
) {
    let key = format!(
        "{}:{}:{}",
        classification.subject, options.color_scheme, options.font_style
    );
    cache
        .record_template(
            key,
            DesignTemplate {
                subject: classification.subject.clone(),
                color_scheme: options.color_scheme.clone(),
                font_combination: options.font_style.clone(),
                layout_style: options.visual_density.clone(),
                success_score,
                usage_count: 1,
                last_used: Utc::now(),
            },
        )
        .await;
}

// =============================================================================
// LEGACY FIVE-STAGE ENGINE
// =============================================================================

pub struct StudyNoteEngine {
    backend: Arc<dyn GenerationBackend>,
    cache: Arc<LearningCache>,
}

impl StudyNoteEngine {
    pub fn new(backend: Arc<dyn GenerationBackend>, cache: Arc<LearningCache>) -> Self {
        Self { backend, cache }
    }

    /// Run the full pipeline over acquired text.
    pub async fn run(&self, text: &str, options: &NoteGenOptions) -> Result<NoteGenOutput> {
        let backend = self.backend.as_ref();

        let classification = classify_cached(backend, &self.cache, text).await?;
        let segmented = stages::segment(backend, text, &classification).await?;
        let formatted = stages::format_notes(backend, &segmented, &classification).await?;
        let layout = stages::design_layout(backend, &formatted, options).await?;

        let html = render_html(&formatted, Some(&layout), &[], options);
        let filename = note_filename(&formatted.title);

        record_design(&self.cache, &classification, options, QUALITY_SCORE_MAX / 2.0).await;
        self.cache.persist().await?;

        info!(
            title = %formatted.title,
            html_len = html.len(),
            "study-note pipeline complete"
        );

        Ok(NoteGenOutput {
            title: formatted.title,
            html,
            filename,
        })
    }
}

// =============================================================================
// ADVANCED ENGINE
// =============================================================================

pub struct AdvancedEngine {
    backend: Arc<dyn GenerationBackend>,
    cache: Arc<LearningCache>,
}

impl AdvancedEngine {
    pub fn new(backend: Arc<dyn GenerationBackend>, cache: Arc<LearningCache>) -> Self {
        Self { backend, cache }
    }

    /// Static description of the pipeline stages, returned verbatim by the
    /// advanced endpoint's JSON branch.
    pub fn pipeline_description() -> serde_json::Value {
        serde_json::json!([
            {"stage": "classifier", "role": "subject, tone, language and difficulty analysis"},
            {"stage": "segmenter", "role": "structure content into typed sections"},
            {"stage": "formatter", "role": "visual decoration: emoji, colors, highlights"},
            {"stage": "layout", "role": "page design: positioned blocks, fonts, palette"},
            {"stage": "diagram", "role": "optional Mermaid diagrams, degrades to none"}
        ])
    }

    pub async fn run(&self, text: &str, options: &NoteGenOptions) -> Result<AdvancedOutput> {
        let backend = self.backend.as_ref();
        let run_start = Instant::now();
        let mut timings = Vec::with_capacity(5);

        let mut timed = |stage: &str, start: Instant| {
            timings.push(StageTiming {
                stage: stage.to_string(),
                duration_ms: start.elapsed().as_millis() as u64,
            });
        };

        let start = Instant::now();
        let classification = classify_cached(backend, &self.cache, text).await?;
        timed(stages::classifier::STAGE, start);

        let start = Instant::now();
        let segmented = stages::segment(backend, text, &classification).await?;
        timed(stages::segmenter::STAGE, start);

        let start = Instant::now();
        let formatted = stages::format_notes(backend, &segmented, &classification).await?;
        timed(stages::formatter::STAGE, start);

        let start = Instant::now();
        let layout = stages::design_layout(backend, &formatted, options).await?;
        timed(stages::layout::STAGE, start);

        let start = Instant::now();
        let diagrams =
            stages::generate_diagrams(backend, &segmented, options.include_diagrams).await?;
        timed(stages::diagram::STAGE, start);

        let html = render_html(&formatted, Some(&layout), &diagrams, options);
        let filename = note_filename(&formatted.title);

        let score = quality_score(&formatted, &layout, &diagrams);
        let total_ms = run_start.elapsed().as_millis() as u64;

        self.cache
            .record_metric(PerformanceMetric {
                processing_ms: total_ms,
                satisfaction: score,
                error_rate: 0.0,
                timestamp: Utc::now(),
                stage: "advanced".to_string(),
                input_size: text.len(),
                output_quality: score,
            })
            .await;
        record_design(&self.cache, &classification, options, score).await;
        self.cache.persist().await?;

        info!(
            title = %formatted.title,
            total_ms,
            quality = score,
            diagrams = diagrams.len(),
            "advanced pipeline complete"
        );

        Ok(AdvancedOutput {
            title: formatted.title,
            html,
            filename,
            diagram_count: diagrams.len(),
            metrics: ProcessingMetrics {
                total_ms,
                stages: timings,
                quality_score: score,
            },
        })
    }
}
