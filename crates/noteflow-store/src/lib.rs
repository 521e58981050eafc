//! # noteflow-store
//!
//! Process-local note storage and the file-backed learning cache.
//!
//! Notes are ephemeral (in-memory for the process lifetime). The learning
//! cache persists across restarts through a [`noteflow_core::CacheBackend`],
//! either in memory or as a single JSON file.

pub mod learning;
pub mod notes;

pub use learning::{JsonFileBackend, LearningCache, MemoryBackend};
pub use notes::InMemoryNoteStore;
