//! In-process note storage.
//!
//! `MemoryStore` keeps notes as BSON documents and understands the subset of
//! the query language the service uses: field equality filters and `$set`
//! updates. It is what the test suites run against.

use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use notes_core::Note;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{ID_FIELD, NoteDocument};
use crate::repository::{Filter, NoteRepository, Update};

/// Note store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `notes`.
    pub fn with_notes(notes: &[Note]) -> StoreResult<Self> {
        let documents = notes
            .iter()
            .map(|note| bson::to_document(&NoteDocument::from(note)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            documents: RwLock::new(documents),
        })
    }

    /// Number of stored notes.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no notes.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn matches(document: &Document, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

fn apply_update(document: &mut Document, updates: &Update) -> StoreResult<()> {
    for (operator, fields) in updates {
        let Bson::Document(fields) = fields else {
            return Err(StoreError::Backend(format!(
                "update operator {} expects a document",
                operator
            )));
        };
        match operator.as_str() {
            "$set" => {
                for (key, value) in fields {
                    if key == ID_FIELD {
                        return Err(StoreError::Backend(
                            "the _id field cannot be modified".to_string(),
                        ));
                    }
                    document.insert(key.clone(), value.clone());
                }
            }
            other => {
                return Err(StoreError::Backend(format!(
                    "unsupported update operator {}",
                    other
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_notes(&self, filter: Filter) -> StoreResult<Vec<Note>> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .filter(|doc| matches(doc, &filter))
            .map(|doc| {
                let stored: NoteDocument = bson::from_document(doc.clone())?;
                Note::try_from(stored)
            })
            .collect()
    }

    async fn create_note(&self, note: &Note) -> StoreResult<()> {
        let document = bson::to_document(&NoteDocument::from(note))?;
        let mut documents = self.documents.write().await;

        if documents
            .iter()
            .any(|doc| doc.get(ID_FIELD) == document.get(ID_FIELD))
        {
            return Err(StoreError::Backend(format!(
                "duplicate key error: _id {}",
                note.id
            )));
        }

        documents.push(document);
        Ok(())
    }

    async fn update_note(&self, filter: Filter, updates: Update) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        let Some(document) = documents.iter_mut().find(|doc| matches(doc, &filter)) else {
            return Err(StoreError::NotFound("no notes were updated".to_string()));
        };

        // Validate against a copy so a bad update leaves the note untouched.
        let mut updated = document.clone();
        apply_update(&mut updated, &updates)?;
        bson::from_document::<NoteDocument>(updated.clone())?;
        *document = updated;
        Ok(())
    }

    async fn delete_note(&self, filter: Filter) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        let Some(index) = documents.iter().position(|doc| matches(doc, &filter)) else {
            return Err(StoreError::NotFound("no notes were deleted".to_string()));
        };
        documents.remove(index);
        Ok(())
    }
}
