//! notes-core: shared types for the notes API.
//!
//! This crate provides:
//! - `NoteId`, the 12-byte note identifier and its hex encoding
//! - `Note`, the persisted record as seen on the wire
//! - `NoteRequest`, the body accepted on create and update
//!
//! Both the storage layer and the HTTP server depend on these types;
//! neither depends on the other's representation.

pub mod types;

pub use types::{Note, NoteId, NoteIdParseError, NoteRequest};
