//! Route definitions for the short-link API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::handler::{create_short_url, get_short_url, list_short_urls, redirect_url};
use crate::service::ShortLinkService;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ShortLinkService>,

    /// Prefix for `shortUrl` in responses, e.g. "http://localhost:8080/s"
    pub base_url: Arc<str>,
}

impl AppState {
    pub fn new(service: ShortLinkService, base_url: impl Into<Arc<str>>) -> Self {
        Self {
            service: Arc::new(service),
            base_url: base_url.into(),
        }
    }
}

/// Creates the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /s/{code}` - Redirects to the original URL
/// - `GET /api/shorturls` - Lists all short URLs, oldest first
/// - `POST /api/shorturls` - Creates a new short URL
/// - `GET /api/shorturls/{code}` - Returns one short URL record
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use shortlink::database::RedbStore;
/// # use shortlink::generator::RandomGenerator;
/// # use shortlink::route::{create_app, AppState};
/// # use shortlink::service::ShortLinkService;
/// let store = RedbStore::open("data.db").unwrap();
/// let service = ShortLinkService::new(Arc::new(store), Arc::new(RandomGenerator::default()));
/// let app = create_app(AppState::new(service, "http://localhost:8080/s"));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/shorturls", get(list_short_urls).post(create_short_url))
        .route("/shorturls/{code}", get(get_short_url));

    Router::new()
        .route("/s/{code}", get(redirect_url))
        .nest("/api", api_routes)
        .with_state(state)
}

/// CORS policy for the browser frontend
///
/// An origin that is not a valid header value disables cross-origin access
/// instead of failing startup.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(err) => {
            warn!(%origin, error = %err, "ignoring invalid CORS origin");
            layer
        }
    }
}
