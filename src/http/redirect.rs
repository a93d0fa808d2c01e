//! Redirects to the Python application.
//!
//! Every request the listener does not answer itself is sent to the same path
//! on the upstream application. This is a redirect, not a proxy: method, body
//! and headers are not forwarded, and most clients follow a 302 with a GET.

use axum::extract::State;
use axum::http::{header::LOCATION, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Fallback handler redirecting to the upstream application.
pub async fn redirect_to_upstream(State(state): State<AppState>, uri: Uri) -> Response {
    let location = upstream_location(&state.upstream, &uri);
    tracing::debug!(from = %uri, to = %location, "Redirecting to application");
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// Upstream URL for `uri`, keeping its path and query verbatim.
pub fn upstream_location(base: &str, uri: &Uri) -> String {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("{}{}", base.trim_end_matches('/'), path_and_query)
}
