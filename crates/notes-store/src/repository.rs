//! The data-access contract for notes.

use async_trait::async_trait;
use mongodb::bson::Document;
use notes_core::Note;

use crate::error::StoreResult;

/// Filter selecting notes. An empty filter matches every note.
pub type Filter = Document;

/// Update document, e.g. `{ "$set": { ... } }`.
pub type Update = Document;

/// Note CRUD over a document store.
///
/// Filters and updates are opaque here: whatever the caller builds is handed
/// to the backend as-is. Every call is cancelled by dropping its future.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Liveness probe against the primary.
    async fn ping(&self) -> StoreResult<()>;

    /// All notes matching `filter`, in no particular order.
    async fn get_notes(&self, filter: Filter) -> StoreResult<Vec<Note>>;

    /// Insert exactly one note.
    async fn create_note(&self, note: &Note) -> StoreResult<()>;

    /// Apply `updates` to the first note matching `filter`.
    ///
    /// Fails with `StoreError::NotFound` when nothing matches.
    async fn update_note(&self, filter: Filter, updates: Update) -> StoreResult<()>;

    /// Delete at most one note matching `filter`.
    ///
    /// Fails with `StoreError::NotFound` when nothing was deleted.
    async fn delete_note(&self, filter: Filter) -> StoreResult<()>;
}
