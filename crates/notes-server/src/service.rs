//! Note orchestration between the HTTP layer and its collaborators.
//!
//! `NotesService` turns public inputs (hex ids, request bodies) into store
//! filters and update documents, and runs the save-to-content-service
//! workflow. It holds no request state; the caller's bearer token is an
//! argument wherever it is needed.

use std::sync::Arc;

use chrono::Utc;
use notes_core::{Note, NoteId, NoteIdParseError, NoteRequest};
use notes_store::bson::doc;
use notes_store::models::{bson_datetime, object_id};
use notes_store::{Filter, NoteRepository, StoreError};

use crate::external::{ContentUploader, ExternalError, FileUpload, TokenValidator};

/// Stem used when a note name yields an empty filename.
const FALLBACK_STEM: &str = "note";

/// Errors surfaced by service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The id was not 24 hex characters.
    #[error("{0}")]
    BadIdentifier(#[from] NoteIdParseError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    External(#[from] ExternalError),

    /// A lookup by id found nothing.
    #[error("no note found with ID '{0}'")]
    NoteNotFound(NoteId),
}

/// Note operations used by the route handlers.
#[derive(Clone)]
pub struct NotesService {
    store: Arc<dyn NoteRepository>,
    validator: Arc<dyn TokenValidator>,
    uploader: Arc<dyn ContentUploader>,
}

impl NotesService {
    pub fn new(
        store: Arc<dyn NoteRepository>,
        validator: Arc<dyn TokenValidator>,
        uploader: Arc<dyn ContentUploader>,
    ) -> Self {
        Self {
            store,
            validator,
            uploader,
        }
    }

    /// Check the document store is reachable.
    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }

    /// All notes when `id` is empty, otherwise the notes matching `id`.
    pub async fn get_notes(&self, id: &str) -> Result<Vec<Note>, ServiceError> {
        let filter = if id.is_empty() {
            Filter::new()
        } else {
            id_filter(id.parse()?)
        };

        Ok(self.store.get_notes(filter).await?)
    }

    /// Insert a new note and return its id.
    pub async fn create_note(&self, request: NoteRequest) -> Result<NoteId, ServiceError> {
        let note = Note::from_request(request, Utc::now());
        self.store.create_note(&note).await?;

        tracing::debug!(note_id = %note.id, "Note inserted");
        Ok(note.id)
    }

    /// Replace name and text of the note `id` and refresh its timestamp.
    pub async fn update_note(&self, id: &str, request: NoteRequest) -> Result<(), ServiceError> {
        let id: NoteId = id.parse()?;

        let updates = doc! {
            "$set": {
                "name": request.name,
                "text": request.text,
                "lastEditedTs": bson_datetime(Utc::now()),
            }
        };

        Ok(self.store.update_note(id_filter(id), updates).await?)
    }

    /// Delete the note `id`.
    pub async fn delete_note(&self, id: &str) -> Result<(), ServiceError> {
        let id: NoteId = id.parse()?;
        Ok(self.store.delete_note(id_filter(id)).await?)
    }

    /// Upload the text of note `id` to the content service as a `.txt` file,
    /// authenticated with the caller's `token`.
    pub async fn send_to_content_service(&self, token: &str, id: &str) -> Result<(), ServiceError> {
        let id: NoteId = id.parse()?;

        let note = self
            .store
            .get_notes(id_filter(id))
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::NoteNotFound(id))?;

        let upload = FileUpload {
            filename: upload_filename(&note.name),
            content: note.text.into_bytes(),
        };

        tracing::debug!(
            note_id = %id,
            filename = %upload.filename,
            bytes = upload.content.len(),
            "Uploading note to content service"
        );

        Ok(self.uploader.send(token, upload).await?)
    }

    /// Check a caller's bearer token with the login service.
    pub async fn validate_token(&self, token: &str) -> Result<(), ServiceError> {
        Ok(self.validator.validate(token).await?)
    }
}

impl std::fmt::Debug for NotesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotesService").finish_non_exhaustive()
    }
}

fn id_filter(id: NoteId) -> Filter {
    doc! { "_id": object_id(id) }
}

/// Filename a note is uploaded under.
///
/// Spaces are removed, the last extension is dropped and `.txt` appended:
/// `"my note"` becomes `mynote.txt`, `"draft.v2.md"` becomes `draft.v2.txt`.
pub fn upload_filename(name: &str) -> String {
    let compact = name.replace(' ', "");

    // An extension is a final `.suffix` not followed by a path separator.
    let stem = match compact.rfind(['.', '/']) {
        Some(pos) if compact[pos..].starts_with('.') => &compact[..pos],
        _ => compact.as_str(),
    };

    if stem.is_empty() {
        format!("{}.txt", FALLBACK_STEM)
    } else {
        format!("{}.txt", stem)
    }
}
