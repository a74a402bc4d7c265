//! Forwarding notes to the content service.

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};

use crate::error::{ApiResponse, ApiResult};
use crate::extract::BearerToken;
use crate::routes::service_error;
use crate::state::AppState;

/// POST /save/{id} - Upload the note's text to the content service.
///
/// The upload is authenticated with the caller's own bearer token.
///
/// # Response
///
/// - 200 OK: confirmation message
/// - 404 Not Found: no note with that ID
/// - 500 Internal Server Error: content service unreachable or refused
async fn send_to_content_service(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<String>> {
    state
        .service()
        .send_to_content_service(token.as_str(), &id)
        .await
        .map_err(service_error("Error sending note to content service"))?;

    tracing::info!(note_id = %id, "Note sent to content service");
    Ok(ApiResponse::ok(format!(
        "Note with ID '{}' sent to content service successfully",
        id
    )))
}

/// Build content service routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/save/{id}", post(send_to_content_service))
}
