//! Health check endpoint.
//!
//! Liveness of the launcher process only: it answers even when the Python
//! application has exited or never started.

use axum::extract::State;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};

use crate::config::{HEALTH_BODY, HEALTH_PATH};
use crate::http::redirect::redirect_to_upstream;
use crate::state::AppState;

/// Health check handler, mounted for every method.
///
/// Only the bare path counts as a health check: `/health?x=1` is an ordinary
/// request and is redirected like any other.
pub async fn health(state: State<AppState>, uri: Uri) -> Response {
    if uri.path_and_query().map(|pq| pq.as_str()) == Some(HEALTH_PATH) {
        HEALTH_BODY.into_response()
    } else {
        redirect_to_upstream(state, uri).await
    }
}
