//! notes-store: storage layer for the notes API.
//!
//! This crate provides:
//! - The `NoteRepository` trait, the data-access contract used by the service
//! - `Store`, a MongoDB-backed implementation with a pooled client
//! - `MemoryStore`, an in-process implementation for tests
//!
//! Filters and update documents are plain BSON documents. They are built by
//! the caller and passed through untouched.
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_store::{Filter, NoteRepository, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! store.ping().await?;
//! let notes = store.get_notes(Filter::new()).await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use models::NoteDocument;
pub use repository::{Filter, NoteRepository, Update};
pub use store::{Store, StoreConfig};

// Re-export the BSON crate so callers build filters with the same version.
pub use mongodb::bson;
pub use notes_core;
