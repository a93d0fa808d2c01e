use std::io;

use crate::http::ServerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Listener error: {0}")]
    Server(#[from] ServerError),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    pub fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        AppError::Spawn {
            program: program.into(),
            source,
        }
    }
}
