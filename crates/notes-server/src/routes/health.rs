//! Health check endpoint.

use axum::{Router, extract::State, routing::get};

use crate::error::{ApiResponse, ApiResult};
use crate::routes::service_error;
use crate::state::AppState;

/// Body returned when the store answers a ping.
pub const HEALTHY_MESSAGE: &str = "API is running and connected to database";

/// GET /health - Store connectivity check. Needs no authorization.
async fn check_health(State(state): State<AppState>) -> ApiResult<ApiResponse<&'static str>> {
    state
        .service()
        .ping()
        .await
        .map_err(service_error("Error connecting to database"))?;

    Ok(ApiResponse::ok(HEALTHY_MESSAGE))
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(check_health))
}
