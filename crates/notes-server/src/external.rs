//! Outbound clients for the login service and the content service.
//!
//! Both collaborators sit behind traits so the service can be driven by
//! fakes in tests. `HttpExternalApi` is the reqwest-backed implementation of
//! both. It holds no per-request state: the bearer token for an upload is
//! passed with each call.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

use crate::config::{REQUEST_TIMEOUT, ServerConfig};

/// Errors from the login or content service.
#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    /// The collaborator's base URL was not configured.
    #[error("{0}")]
    ConfigMissing(&'static str),

    /// The request could not be sent or the response not received.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The login service rejected the token.
    #[error("{0}")]
    Unauthorized(String),

    /// The content service answered with something other than 200.
    #[error("{0}")]
    Upstream(String),
}

/// Form field the content service reads the file from.
pub const UPLOAD_FIELD: &str = "file";

/// A single file sent to the content service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl FileUpload {
    /// The `multipart/form-data` body carrying this file under
    /// [`UPLOAD_FIELD`].
    pub fn into_form(self) -> Result<Form, ExternalError> {
        let part = Part::bytes(self.content)
            .file_name(self.filename)
            .mime_str("application/octet-stream")?;
        Ok(Form::new().part(UPLOAD_FIELD, part))
    }
}

/// Validates caller bearer tokens.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Succeeds only if the login service answers 200 for `token`.
    async fn validate(&self, token: &str) -> Result<(), ExternalError>;
}

/// Uploads files to the content service.
#[async_trait]
pub trait ContentUploader: Send + Sync {
    /// POST `upload` as a multipart form, authenticated as `token`.
    async fn send(&self, token: &str, upload: FileUpload) -> Result<(), ExternalError>;
}

fn non_200(status: StatusCode) -> String {
    format!("non-200 status code received: {}", status.as_u16())
}

/// HTTP client for both external services.
#[derive(Debug, Clone)]
pub struct HttpExternalApi {
    client: reqwest::Client,
    login_service_url: String,
    content_service_url: String,
}

impl HttpExternalApi {
    /// Build a client from server configuration.
    pub fn new(config: &ServerConfig) -> Result<Self, ExternalError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(
            client,
            config.login_service_url.clone(),
            config.content_service_url.clone(),
        ))
    }

    /// Build from an existing reqwest client.
    pub fn with_client(
        client: reqwest::Client,
        login_service_url: impl Into<String>,
        content_service_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            login_service_url: login_service_url.into(),
            content_service_url: content_service_url.into(),
        }
    }
}

#[async_trait]
impl TokenValidator for HttpExternalApi {
    async fn validate(&self, token: &str) -> Result<(), ExternalError> {
        if self.login_service_url.is_empty() {
            return Err(ExternalError::ConfigMissing(
                "login service url cannot be empty",
            ));
        }

        let response = self
            .client
            .post(format!("{}/token", self.login_service_url))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(status = status.as_u16(), "Login service rejected token");
            return Err(ExternalError::Unauthorized(non_200(status)));
        }

        Ok(())
    }
}

#[async_trait]
impl ContentUploader for HttpExternalApi {
    async fn send(&self, token: &str, upload: FileUpload) -> Result<(), ExternalError> {
        if self.content_service_url.is_empty() {
            return Err(ExternalError::ConfigMissing(
                "content service url cannot be empty",
            ));
        }

        let form = upload.into_form()?;
        tracing::debug!(boundary = %form.boundary(), "Sending multipart upload");

        let response = self
            .client
            .post(format!("{}/upload", self.content_service_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExternalError::Upstream(non_200(status)));
        }

        Ok(())
    }
}
