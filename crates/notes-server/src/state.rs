//! Application state shared across handlers.

use std::sync::Arc;

use crate::service::NotesService;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
/// Nothing in it changes after start-up.
#[derive(Clone, Debug)]
pub struct AppState {
    service: Arc<NotesService>,
}

impl AppState {
    /// Create new application state.
    pub fn new(service: NotesService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Get a reference to the notes service.
    pub fn service(&self) -> &NotesService {
        &self.service
    }
}
