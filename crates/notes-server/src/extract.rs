//! Request extractors: bearer-token authorization and JSON bodies.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::state::AppState;

/// Message for a request without an `Authorization` header.
pub const MISSING_AUTH_MESSAGE: &str = "no authorization header found";

/// Message for an `Authorization` header not shaped `Bearer <token>`.
pub const MALFORMED_AUTH_MESSAGE: &str = "authorization header must be in format 'Bearer'";

/// A caller token that the login service accepted.
///
/// Extracting this runs the whole authorization pipeline, so any handler
/// taking a `BearerToken` is protected. The token belongs to this request
/// only and is passed on explicitly where a downstream call needs it.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Token part of `Bearer <token>`: literal scheme, one space, and a
/// non-empty token without further whitespace.
fn parse_bearer(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty() && !token.contains(char::is_whitespace))
}

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            tracing::warn!("Request without authorization header");
            return Err(ApiError::BadRequest(MISSING_AUTH_MESSAGE.to_string()));
        };

        let token = value
            .to_str()
            .ok()
            .and_then(parse_bearer)
            .ok_or_else(|| {
                tracing::warn!("Malformed authorization header");
                ApiError::BadRequest(MALFORMED_AUTH_MESSAGE.to_string())
            })?;

        state.service().validate_token(token).await.map_err(|e| {
            tracing::error!(error = %e, "Error validating token");
            ApiError::Unauthorized(e.to_string())
        })?;

        Ok(BearerToken(token.to_string()))
    }
}

/// JSON request body decoded with `serde_json`.
///
/// The body is read whatever its declared content type, and any decode
/// failure is a 400 carrying the decoder's message.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::error!(error = %e, "Error reading request body");
            ApiError::BadRequest(e.body_text())
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::error!(error = %e, "Error decoding request body");
            ApiError::BadRequest(e.to_string())
        })
    }
}
