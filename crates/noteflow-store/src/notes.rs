//! In-memory note repository.
//!
//! Notes live for the lifetime of the process. There is no persistence
//! and no capacity bound; a restart starts empty.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use noteflow_core::{Error, Note, NoteRepository, Result};

/// Note repository backed by a process-local map.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<HashMap<Uuid, Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes.
    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notes.read().await.is_empty()
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteStore {
    async fn insert(&self, note: Note) -> Result<()> {
        self.notes.write().await.insert(note.id, note);
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        self.notes
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::NoteNotFound(id))
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self.notes.read().await.values().cloned().collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.notes
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NoteNotFound(id))
    }
}
