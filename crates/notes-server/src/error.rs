//! API error types and the JSON response envelope.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::service::ServiceError;

/// Content type set on every response.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// API error that can be returned from handlers.
///
/// The message is sent to the client verbatim as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("{0}")]
    BadRequest(String),

    /// Unauthorized (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Internal server error (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::BadIdentifier(_) => Self::BadRequest(message),
            ServiceError::NoteNotFound(_) => Self::NotFound(message),
            ServiceError::Store(ref e) if e.is_not_found() => Self::NotFound(message),
            ServiceError::Store(_) | ServiceError::External(_) => Self::Internal(message),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::new(
            status,
            ErrorResponse {
                error: self.to_string(),
            },
        )
        .into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// A status code plus a JSON-encoded value.
///
/// Unlike `axum::Json` this always declares `charset=utf-8`, and a
/// `204 No Content` response carries no body at all.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, body: T) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// 200 with `body`.
    pub fn ok(body: T) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

impl ApiResponse<()> {
    /// 204 without a body.
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let content_type = [(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        )];

        let Some(body) = self.body.filter(|_| self.status != StatusCode::NO_CONTENT) else {
            return (self.status, content_type).into_response();
        };

        match serde_json::to_vec(&body) {
            Ok(bytes) => (self.status, content_type, bytes).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Error encoding response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    content_type,
                    r#"{"error":"error encoding response"}"#,
                )
                    .into_response()
            }
        }
    }
}
