//! MongoDB-backed note storage.
//!
//! The `Store` owns a single driver client, created once at start-up. The
//! driver pools connections internally, so handlers share the store through
//! an `Arc` and never connect per request.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::doc,
    options::{ReadPreference, SelectionCriteria},
};
use notes_core::Note;

use crate::error::{StoreError, StoreResult};
use crate::models::NoteDocument;
use crate::repository::{Filter, NoteRepository, Update};

/// Configuration for connecting to the document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// MongoDB connection URI.
    pub mongo_uri: String,
    /// Logical database name.
    pub database: String,
    /// Collection holding notes.
    pub collection: String,
}

impl StoreConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads (all required):
    /// - `MONGO_URI` - connection URI
    /// - `DATABASE` - database name
    /// - `COLLECTION` - notes collection name
    pub fn from_env() -> StoreResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let require = |name: &str| {
            lookup(name).filter(|v| !v.is_empty()).ok_or_else(|| {
                StoreError::ConfigError(format!("{} environment variable not set", name))
            })
        };

        Ok(Self {
            mongo_uri: require("MONGO_URI")?,
            database: require("DATABASE")?,
            collection: require("COLLECTION")?,
        })
    }
}

/// Note store backed by a MongoDB collection.
#[derive(Debug, Clone)]
pub struct Store {
    client: Client,
    notes: Collection<NoteDocument>,
}

impl Store {
    /// Build the driver client for the given configuration.
    ///
    /// The driver connects lazily; use [`NoteRepository::ping`] to check
    /// reachability.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Creating document store client"
        );

        let client = Client::with_uri_str(&config.mongo_uri).await?;
        let notes = client
            .database(&config.database)
            .collection::<NoteDocument>(&config.collection);

        Ok(Self { client, notes })
    }
}

#[async_trait]
impl NoteRepository for Store {
    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .selection_criteria(SelectionCriteria::ReadPreference(ReadPreference::Primary))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn get_notes(&self, filter: Filter) -> StoreResult<Vec<Note>> {
        let cursor = self.notes.find(filter).await?;
        let documents: Vec<NoteDocument> = cursor.try_collect().await?;

        documents.into_iter().map(Note::try_from).collect()
    }

    async fn create_note(&self, note: &Note) -> StoreResult<()> {
        self.notes.insert_one(NoteDocument::from(note)).await?;
        Ok(())
    }

    async fn update_note(&self, filter: Filter, updates: Update) -> StoreResult<()> {
        match self.notes.find_one_and_update(filter, updates).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound("no notes were updated".to_string())),
        }
    }

    async fn delete_note(&self, filter: Filter) -> StoreResult<()> {
        let result = self.notes.delete_one(filter).await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound("no notes were deleted".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_config_from_vars() {
        let env = vars(&[
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("DATABASE", "notes"),
            ("COLLECTION", "notes"),
        ]);
        let config = StoreConfig::from_vars(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.mongo_uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "notes");
        assert_eq!(config.collection, "notes");
    }

    #[test]
    fn test_config_missing_var() {
        let env = vars(&[("MONGO_URI", "mongodb://localhost:27017"), ("DATABASE", "notes")]);
        let err = StoreConfig::from_vars(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, StoreError::ConfigError(ref m) if m.contains("COLLECTION")));
    }

    #[test]
    fn test_config_empty_var_is_missing() {
        let env = vars(&[("MONGO_URI", ""), ("DATABASE", "notes"), ("COLLECTION", "notes")]);
        let err = StoreConfig::from_vars(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("MONGO_URI"));
    }
}
