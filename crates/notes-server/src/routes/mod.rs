//! Route definitions for the HTTP API.

pub mod health;
pub mod notes;
pub mod save;

use axum::{BoxError, Router, error_handling::HandleErrorLayer};
use http::{HeaderName, Method, header};
use tower::ServiceBuilder;
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::RequestBodyTimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::REQUEST_TIMEOUT;
use crate::error::ApiError;
use crate::middleware::request_id::{
    propagate_request_id_layer, request_span, set_request_id_layer,
};
use crate::service::ServiceError;
use crate::state::AppState;

/// Message for a request that ran past the server deadline.
pub const TIMEOUT_MESSAGE: &str = "request timed out";

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(notes::routes())
        .merge(save::routes())
        .with_state(state)
}

/// Build the router wrapped in the full middleware stack.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
        .layer(RequestBodyTimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(set_request_id_layer())
        .layer(cors_layer())
}

/// Turn a failed middleware (only the deadline can fail) into a JSON error.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::error!(
            timeout_secs = REQUEST_TIMEOUT.as_secs(),
            "Request exceeded deadline"
        );
        ApiError::Internal(TIMEOUT_MESSAGE.to_string())
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        ApiError::Internal(err.to_string())
    }
}

/// CORS policy: any origin, the four verbs the API serves.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            HeaderName::from_static("x-requested-with"),
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header::CONTENT_TYPE,
        ])
}

/// Log a service failure at the handler boundary and map it to a response.
pub(crate) fn service_error(context: &'static str) -> impl FnOnce(ServiceError) -> ApiError {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        ApiError::from(e)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use http::{Request, StatusCode};
    use notes_core::Note;
    use notes_store::{Filter, MemoryStore, NoteRepository, StoreResult, Update};
    use tower::ServiceExt;

    use super::*;
    use crate::error::JSON_CONTENT_TYPE;
    use crate::external::{ContentUploader, ExternalError, FileUpload, TokenValidator};
    use crate::extract::{MALFORMED_AUTH_MESSAGE, MISSING_AUTH_MESSAGE};
    use crate::service::NotesService;

    const ZERO_ID: &str = "000000000000000000000000";

    /// Accepts every token and upload, counting validations.
    #[derive(Default)]
    struct AllowAll {
        validations: AtomicUsize,
    }

    #[async_trait]
    impl TokenValidator for AllowAll {
        async fn validate(&self, _token: &str) -> Result<(), ExternalError> {
            self.validations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl ContentUploader for AllowAll {
        async fn send(&self, _token: &str, _upload: FileUpload) -> Result<(), ExternalError> {
            Ok(())
        }
    }

    /// Store that never answers a read within the deadline.
    struct SlowStore;

    #[async_trait]
    impl NoteRepository for SlowStore {
        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
        async fn get_notes(&self, _filter: Filter) -> StoreResult<Vec<Note>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
        async fn create_note(&self, _note: &Note) -> StoreResult<()> {
            Ok(())
        }
        async fn update_note(&self, _filter: Filter, _updates: Update) -> StoreResult<()> {
            Ok(())
        }
        async fn delete_note(&self, _filter: Filter) -> StoreResult<()> {
            Ok(())
        }
    }

    fn app_with(store: Arc<dyn NoteRepository>) -> (Router, Arc<AllowAll>) {
        let external = Arc::new(AllowAll::default());
        let service = NotesService::new(store, external.clone(), external.clone());
        (build_app(AppState::new(service)), external)
    }

    fn app() -> Router {
        app_with(Arc::new(MemoryStore::new())).0
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#""API is running and connected to database""#);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        let response = app()
            .oneshot(
                Request::patch(format!("/note/{ZERO_ID}"))
                    .header(header::AUTHORIZATION, "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_created_note_is_listed() {
        let app = app();
        let response = app
            .clone()
            .oneshot(
                Request::post("/note")
                    .header(header::AUTHORIZATION, "Bearer good")
                    .body(Body::from(r#"{"name":"n","text":"t"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get("/notes")
                    .header(header::AUTHORIZATION, "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let notes = json_body(response).await;
        assert_eq!(notes.as_array().unwrap().len(), 1);
        assert_eq!(notes[0]["name"], "n");
    }

    #[tokio::test]
    async fn test_protected_routes_reject_bad_headers_before_validation() {
        let (app, validator) = app_with(Arc::new(MemoryStore::new()));

        let routes = [
            (Method::GET, "/notes".to_string()),
            (Method::GET, format!("/note/{ZERO_ID}")),
            (Method::POST, "/note".to_string()),
            (Method::PUT, format!("/note/{ZERO_ID}")),
            (Method::DELETE, format!("/note/{ZERO_ID}")),
            (Method::POST, format!("/save/{ZERO_ID}")),
        ];
        let headers = [
            (None, MISSING_AUTH_MESSAGE),
            (Some("test"), MALFORMED_AUTH_MESSAGE),
            (Some("Basic dXNlcjpwYXNz"), MALFORMED_AUTH_MESSAGE),
            (Some("Bearer"), MALFORMED_AUTH_MESSAGE),
            (Some("Bearer "), MALFORMED_AUTH_MESSAGE),
        ];

        for (method, path) in &routes {
            for (authorization, message) in headers {
                let mut request = Request::builder().method(method.clone()).uri(path.as_str());
                if let Some(value) = authorization {
                    request = request.header(header::AUTHORIZATION, value);
                }
                let response = app
                    .clone()
                    .oneshot(request.body(Body::from("{}")).unwrap())
                    .await
                    .unwrap();

                assert_eq!(
                    response.status(),
                    StatusCode::BAD_REQUEST,
                    "{method} {path} with {authorization:?}"
                );
                assert_eq!(
                    json_body(response).await,
                    serde_json::json!({ "error": message }),
                    "{method} {path} with {authorization:?}"
                );
            }
        }

        assert_eq!(validator.validations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_times_out_with_json_error() {
        let (app, _) = app_with(Arc::new(SlowStore));

        let response = app
            .oneshot(
                Request::get("/notes")
                    .header(header::AUTHORIZATION, "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "error": TIMEOUT_MESSAGE })
        );
    }
}
