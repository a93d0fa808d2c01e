//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;

/// Shared listener state, cloneable across handlers via Arc-wrapped fields.
#[derive(Clone)]
pub struct AppState {
    /// Base URL of the Python application, e.g. `http://localhost:3000`
    pub upstream: Arc<str>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_upstream(config.upstream.base_url())
    }

    pub fn with_upstream(base_url: impl Into<String>) -> Self {
        Self {
            upstream: Arc::from(base_url.into()),
        }
    }
}
