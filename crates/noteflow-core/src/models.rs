//! Data model for the note-generation pipeline.
//!
//! Everything that crosses the HTTP boundary serializes camelCase; the
//! same structs double as the declared JSON output shapes sent to the
//! generation model, so each model-call stage validates its response by
//! deserializing into the typed struct (parse success alone is not
//! trusted as shape correctness).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// =============================================================================
// CONTENT & NOTE
// =============================================================================

/// Acquisition path for inbound content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Pdf,
    Audio,
    VideoUrl,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Text => write!(f, "text"),
            ContentType::Pdf => write!(f, "pdf"),
            ContentType::Audio => write!(f, "audio"),
            ContentType::VideoUrl => write!(f, "video_url"),
        }
    }
}

/// Note lifecycle: `pending` is stamped at creation, `completed` after the
/// digest call succeeds. No other states and no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Completed,
}

/// A visual summary card rendered on the note overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualCard {
    pub icon: String,
    pub label: String,
    pub value: String,
    pub color: String,
}

/// A persisted note record. Immutable after creation except for explicit
/// delete; owned exclusively by the in-memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
    pub visual_cards: Vec<VisualCard>,
    pub original_text: String,
    pub content_type: ContentType,
    pub processing_status: ProcessingStatus,
    pub created_at: DateTime<Utc>,
}

/// Output of the Content Acquirer: normalized plain text plus the
/// acquisition path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredContent {
    pub text: String,
    pub content_type: ContentType,
}

// =============================================================================
// PIPELINE STAGE OUTPUTS (ephemeral, per-request)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Classifier stage output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub subject: String,
    pub tone: String,
    pub language: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Heading,
    Bullet,
    Definition,
    Example,
    Formula,
    Callout,
}

/// One typed section produced by the Segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Segmenter stage output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedContent {
    pub title: String,
    pub sections: Vec<Section>,
}

/// One decorated section produced by the Formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSection {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_terms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

/// Formatter stage output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedNotes {
    pub title: String,
    pub emoji: String,
    pub color_theme: String,
    pub sections: Vec<FormattedSection>,
}

/// Absolute position rectangle for a layout block, in page points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Style descriptor for a layout block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStyle {
    pub font_family: String,
    pub font_size: f64,
    pub color: String,
    pub background: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
}

/// A positioned, styled content unit in the designed note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub content: String,
    pub position: Rect,
    pub style: BlockStyle,
}

/// Page-level style configuration: page size, margins, three font-family
/// roles and a four-color palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStyle {
    pub page_size: String,
    pub margins: f64,
    pub heading_font: String,
    pub body_font: String,
    pub accent_font: String,
    pub palette: Vec<String>,
}

/// Layout Designer stage output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignedLayout {
    pub title: String,
    pub theme: String,
    pub blocks: Vec<LayoutBlock>,
    pub page: PageStyle,
}

/// A Mermaid diagram produced by the Diagram Generator (advanced engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(rename = "type")]
    pub diagram_type: String,
    pub title: String,
    pub mermaid: String,
}

/// Output of the single digest model call behind `/api/process`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDigest {
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
    pub visual_cards: Vec<VisualCard>,
}

// =============================================================================
// GENERATION OPTIONS
// =============================================================================

/// Style options bag accepted by the generate endpoints. Each field is an
/// enumerated string keyed into fixed CSS templates by the Renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteGenOptions {
    #[serde(rename = "generatePDF", default)]
    pub generate_pdf: bool,
    #[serde(default = "default_pdf_style")]
    pub pdf_style: String,
    #[serde(default = "default_color_scheme")]
    pub color_scheme: String,
    #[serde(default = "default_visual_density")]
    pub visual_density: String,
    #[serde(default = "default_font_style")]
    pub font_style: String,
    #[serde(default = "default_complexity_level")]
    pub complexity_level: String,
    #[serde(default)]
    pub include_diagrams: bool,
}

fn default_pdf_style() -> String {
    "clean".to_string()
}
fn default_color_scheme() -> String {
    "pastel".to_string()
}
fn default_visual_density() -> String {
    "balanced".to_string()
}
fn default_font_style() -> String {
    "clean".to_string()
}
fn default_complexity_level() -> String {
    "intermediate".to_string()
}

impl Default for NoteGenOptions {
    fn default() -> Self {
        Self {
            generate_pdf: false,
            pdf_style: default_pdf_style(),
            color_scheme: default_color_scheme(),
            visual_density: default_visual_density(),
            font_style: default_font_style(),
            complexity_level: default_complexity_level(),
            include_diagrams: false,
        }
    }
}

/// Per-stage wall-clock timing recorded by the advanced engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub stage: String,
    pub duration_ms: u64,
}

/// Telemetry returned by the advanced engine alongside the HTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMetrics {
    pub total_ms: u64,
    pub stages: Vec<StageTiming>,
    pub quality_score: f64,
}

// =============================================================================
// LEARNING CACHE
// =============================================================================

/// A single feedback submission, appended to a user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub rating: f64,
    pub features: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// A remembered design combination with its observed success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTemplate {
    pub subject: String,
    pub color_scheme: String,
    pub font_combination: String,
    pub layout_style: String,
    pub success_score: f64,
    pub usage_count: u64,
    pub last_used: DateTime<Utc>,
}

/// Accumulated per-user preferences. The feedback history is append-only
/// telemetry; no pipeline stage currently reads it back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
    pub preferred_colors: Vec<String>,
    pub favorite_layouts: Vec<String>,
    pub complexity_level: Option<String>,
    pub visual_density: Option<String>,
    pub feedback_history: Vec<FeedbackEntry>,
}

/// A cached classification plus the instant it was last stored or served,
/// so eviction drops the oldest-touched entry first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedClassification {
    pub classification: Classification,
    pub last_used: DateTime<Utc>,
}

/// Write-only stage telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    pub processing_ms: u64,
    pub satisfaction: f64,
    pub error_rate: f64,
    pub timestamp: DateTime<Utc>,
    pub stage: String,
    pub input_size: usize,
    pub output_quality: f64,
}

/// The four learning-cache mappings, serialized wholesale to the cache
/// file. BTreeMap keeps the on-disk JSON stable across saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningCacheData {
    #[serde(default)]
    pub classifications: BTreeMap<String, CachedClassification>,
    #[serde(default)]
    pub templates: BTreeMap<String, DesignTemplate>,
    #[serde(default)]
    pub user_preferences: BTreeMap<String, UserPreference>,
    #[serde(default)]
    pub metrics: BTreeMap<String, PerformanceMetric>,
}
