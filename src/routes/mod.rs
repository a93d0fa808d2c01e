//! HTTP routes for the launcher's listener.
//!
//! The bare `/health` target is answered locally for any method; everything else falls back to
//! a redirect to the Python application. Responses are never cacheable.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request.

pub mod health;

use axum::{middleware, routing::any, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_NO_STORE, HEALTH_PATH};
use crate::http::redirect::redirect_to_upstream;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router for the health/redirect listener.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, any(health::health))
        .fallback(redirect_to_upstream)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
