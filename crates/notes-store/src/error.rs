//! Error types for the storage layer.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
///
/// Display strings are the bare underlying message; the HTTP layer puts
/// them into responses verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error reported by the MongoDB driver.
    #[error("{0}")]
    Driver(#[from] mongodb::error::Error),

    /// The store could not be reached with a primary read preference.
    #[error("{0}")]
    Unavailable(String),

    /// An update or delete matched no document.
    #[error("{0}")]
    NotFound(String),

    /// A stored document could not be turned into a note.
    #[error("corrupt note document: {0}")]
    CorruptDocument(String),

    /// A note could not be encoded as BSON.
    #[error("{0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    /// A BSON document could not be decoded as a note.
    #[error("{0}")]
    Decode(#[from] mongodb::bson::de::Error),

    /// Failure from a non-driver backend.
    #[error("{0}")]
    Backend(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Whether this error means the targeted note does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
