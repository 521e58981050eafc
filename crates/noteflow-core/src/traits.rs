//! Trait seams shared across noteflow crates.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{LearningCacheData, Note};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation against a generative model.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// STORAGE TRAITS
// =============================================================================

/// Repository for persisted notes.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note.
    async fn insert(&self, note: Note) -> Result<()>;

    /// Fetch a note by id. `Error::NoteNotFound` if absent.
    async fn fetch(&self, id: Uuid) -> Result<Note>;

    /// List all notes, newest first.
    async fn list(&self) -> Result<Vec<Note>>;

    /// Delete a note by id. `Error::NoteNotFound` if absent.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Persistence backend for the learning cache. The cache is always saved
/// wholesale (last writer wins); backends only load and store the full
/// snapshot.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Load the cache snapshot, `None` if no snapshot exists yet.
    async fn load(&self) -> Result<Option<LearningCacheData>>;

    /// Persist the full cache snapshot.
    async fn save(&self, data: &LearningCacheData) -> Result<()>;
}
