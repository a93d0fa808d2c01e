//! playlist-launcher - bootstrap wrapper for the AI Music Playlist Generator
//!
//! Makes sure the Python application's packages are installed, starts the
//! application as a child process, and keeps a small listener on a fixed port
//! that answers a health check and redirects everything else to the
//! application.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod packages;
pub mod pipeline;
pub mod process;
pub mod routes;
pub mod state;
pub mod toolchain;

pub use error::*;
