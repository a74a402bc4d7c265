//! Note CRUD routes.
//!
//! - GET /notes - List every note
//! - GET /note/{id} - Fetch one note (204 when it does not exist)
//! - POST /note - Create a note
//! - PUT /note/{id} - Replace a note's name and text
//! - DELETE /note/{id} - Delete a note
//!
//! Every route requires a bearer token accepted by the login service.

use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use notes_core::{Note, NoteRequest};

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::{BearerToken, JsonBody};
use crate::routes::service_error;
use crate::state::AppState;

/// Message for an id lookup that returned several notes.
pub const MULTIPLE_NOTES_MESSAGE: &str = "more than one note returned for given ID";

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /notes - List all notes.
async fn list_notes(
    State(state): State<AppState>,
    _token: BearerToken,
) -> ApiResult<ApiResponse<Vec<Note>>> {
    let notes = state
        .service()
        .get_notes("")
        .await
        .map_err(service_error("Error retrieving notes"))?;

    tracing::info!(count = notes.len(), "Listed notes");
    Ok(ApiResponse::ok(notes))
}

/// GET /note/{id} - Fetch a single note.
///
/// # Response
///
/// - 200 OK: the note object
/// - 204 No Content: no note with that ID
/// - 400 Bad Request: malformed ID
async fn get_note(
    State(state): State<AppState>,
    _token: BearerToken,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let mut notes = state
        .service()
        .get_notes(&id)
        .await
        .map_err(service_error("Error retrieving notes"))?;

    match notes.len() {
        0 => Ok(ApiResponse::no_content().into_response()),
        1 => Ok(ApiResponse::ok(notes.remove(0)).into_response()),
        count => {
            tracing::error!(note_id = %id, count, "Invalid note results");
            Err(ApiError::Internal(MULTIPLE_NOTES_MESSAGE.to_string()))
        }
    }
}

/// POST /note - Create a note.
///
/// Body: `{ "name": "...", "text": "..." }`
async fn create_note(
    State(state): State<AppState>,
    _token: BearerToken,
    JsonBody(request): JsonBody<NoteRequest>,
) -> ApiResult<ApiResponse<String>> {
    let id = state
        .service()
        .create_note(request)
        .await
        .map_err(service_error("Error creating note"))?;

    tracing::info!(note_id = %id, "Note created");
    Ok(ApiResponse::ok(format!(
        "Note with ID '{}' created successfuly",
        id
    )))
}

/// PUT /note/{id} - Replace name and text of a note.
async fn edit_note(
    State(state): State<AppState>,
    _token: BearerToken,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<NoteRequest>,
) -> ApiResult<ApiResponse<String>> {
    state
        .service()
        .update_note(&id, request)
        .await
        .map_err(service_error("Error updating note"))?;

    tracing::info!(note_id = %id, "Note updated");
    Ok(ApiResponse::ok(format!(
        "Note with ID '{}' updated successfully",
        id
    )))
}

/// DELETE /note/{id} - Delete a note.
///
/// # Response
///
/// - 200 OK: confirmation message
/// - 404 Not Found: nothing was deleted
async fn delete_note(
    State(state): State<AppState>,
    _token: BearerToken,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<String>> {
    state
        .service()
        .delete_note(&id)
        .await
        .map_err(service_error("Error deleting note"))?;

    tracing::info!(note_id = %id, "Note deleted");
    Ok(ApiResponse::ok(format!(
        "Note with ID '{}' deleted successfully",
        id
    )))
}

/// Build note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list_notes))
        .route("/note", post(create_note))
        .route(
            "/note/{id}",
            get(get_note).put(edit_note).delete(delete_note),
        )
}
