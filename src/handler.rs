//! HTTP request handlers for the short-link API
//!
//! Handlers are thin: they translate requests into [`ShortLinkService`]
//! calls and map [`ServiceError`] onto status codes through [`ApiError`].
//!
//! [`ShortLinkService`]: crate::service::ShortLinkService

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::error;

use crate::error::ServiceError;
use crate::model::{CreateRequest, ShortUrlResponse};
use crate::route::AppState;
use crate::service::ShortLinkService;

/// Error returned by handlers, rendered as `{ "error": "..." }`
#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be decoded
    BadRequest(String),
    Service(ServiceError),
    /// The blocking task running the service call panicked or was cancelled
    Task(JoinError),
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<JoinError> for ApiError {
    fn from(value: JoinError) -> Self {
        Self::Task(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Service(err @ ServiceError::Validation { .. }) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Service(ServiceError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "URL not found".to_string())
            }
            ApiError::Service(err @ ServiceError::GenerationFailure { .. }) => {
                error!(error = %err, "short link creation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Service(ServiceError::Store(err)) => {
                error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal storage error".to_string(),
                )
            }
            ApiError::Task(err) => {
                error!(error = %err, "service task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Runs a service call on the blocking pool
///
/// Store operations may hit the disk (redb commits fsync), so they stay off
/// the async worker threads.
async fn with_service<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&ShortLinkService) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.service);
    Ok(tokio::task::spawn_blocking(move || f(service.as_ref())).await??)
}

/// Creates a new short URL
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Rust homepage",
///   "originalUrl": "https://www.rust-lang.org/"
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - record with `code`, `title`, `shortUrl`, `originalUrl`, `createdAt`
/// - **400 Bad Request** - invalid field or undecodable body
/// - **500 Internal Server Error** - no free code found, or storage failure
pub async fn create_short_url(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let record = with_service(&state, move |service| {
        service.create(&payload.title, &payload.original_url)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShortUrlResponse::from_record(record, &state.base_url)),
    ))
}

/// Lists every short URL, oldest first
pub async fn list_short_urls(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShortUrlResponse>>, ApiError> {
    let records = with_service(&state, |service| service.list()).await?;

    Ok(Json(
        records
            .into_iter()
            .map(|record| ShortUrlResponse::from_record(record, &state.base_url))
            .collect(),
    ))
}

/// Returns a single short URL record
pub async fn get_short_url(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShortUrlResponse>, ApiError> {
    let record = with_service(&state, move |service| service.get(&code)).await?;
    Ok(Json(ShortUrlResponse::from_record(record, &state.base_url)))
}

/// Redirects a short code to its original destination
///
/// # Response
///
/// - **307 Temporary Redirect** - `Location` set to the original URL
/// - **404 Not Found** - unknown code
pub async fn redirect_url(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let original_url = with_service(&state, move |service| service.resolve(&code)).await?;
    Ok(Redirect::temporary(&original_url))
}
