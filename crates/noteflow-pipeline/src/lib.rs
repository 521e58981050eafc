//! # noteflow-pipeline
//!
//! The note-generation flow: model-call stages, the deterministic HTML
//! renderer, headless-browser PDF export, and the engines that sequence
//! them.
//!
//! Control flow: acquire → classify → segment → format → design layout →
//! render → (optional) export PDF. Stages are strict sequential
//! dependencies; a stage failure aborts the run. Diagram generation
//! (advanced engine) is the one stage that degrades instead of failing.

pub mod digest;
pub mod engine;
pub mod pdf;
pub mod render;
pub mod stages;

pub use digest::digest;
pub use engine::{note_filename, AdvancedEngine, AdvancedOutput, NoteGenOutput, StudyNoteEngine};
pub use pdf::PdfExporter;
pub use render::render_html;
