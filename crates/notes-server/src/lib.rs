//! notes-server: HTTP API server for the notes service.
//!
//! This crate provides:
//! - REST endpoints for note CRUD and forwarding notes to a content service
//! - Bearer-token authorization delegated to an external login service
//! - Outbound clients for the login and content services
//! - JSON error responses with a fixed status mapping
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - Per-request read and write deadlines
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_server::{AppState, NotesService, routes};
//!
//! let service = NotesService::new(store, external.clone(), external);
//! let app = routes::build_app(AppState::new(service));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use external::{ContentUploader, ExternalError, FileUpload, HttpExternalApi, TokenValidator};
pub use service::{NotesService, ServiceError};
pub use state::AppState;

// Re-export dependent crates
pub use notes_core;
pub use notes_store;
