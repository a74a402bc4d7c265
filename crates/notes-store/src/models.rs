//! Database models for the storage layer.
//!
//! `NoteDocument` is the shape persisted in the notes collection. It is
//! kept separate from `notes_core::Note` because the store wants a native
//! ObjectId under `_id` and a BSON datetime, while clients see a hex string
//! under `id` and an RFC 3339 timestamp.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use notes_core::{Note, NoteId};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Primary key field.
pub const ID_FIELD: &str = "_id";
/// Note label field.
pub const NAME_FIELD: &str = "name";
/// Note body field.
pub const TEXT_FIELD: &str = "text";
/// Last-edit timestamp field.
pub const LAST_EDITED_TS_FIELD: &str = "lastEditedTs";

/// Document stored in the notes collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(rename = "lastEditedTs")]
    pub last_edited_ts: bson::DateTime,
    pub text: String,
}

/// Convert a note id to the store's native object id.
pub fn object_id(id: NoteId) -> ObjectId {
    ObjectId::from_bytes(*id.as_bytes())
}

/// Convert a timestamp to a BSON datetime (millisecond precision).
pub fn bson_datetime(ts: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(ts.timestamp_millis())
}

impl From<&Note> for NoteDocument {
    fn from(note: &Note) -> Self {
        Self {
            id: object_id(note.id),
            name: note.name.clone(),
            last_edited_ts: bson_datetime(note.last_edited_ts),
            text: note.text.clone(),
        }
    }
}

impl TryFrom<NoteDocument> for Note {
    type Error = StoreError;

    fn try_from(doc: NoteDocument) -> Result<Self, Self::Error> {
        let millis = doc.last_edited_ts.timestamp_millis();
        let last_edited_ts = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            StoreError::CorruptDocument(format!(
                "lastEditedTs out of range for note {}: {}",
                doc.id, millis
            ))
        })?;

        Ok(Note {
            id: NoteId::from_bytes(doc.id.bytes()),
            name: doc.name,
            last_edited_ts,
            text: doc.text,
        })
    }
}
