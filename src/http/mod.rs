//! HTTP listener module.
//!
//! The launcher's own listener only does two things:
//! - answers the liveness check
//! - redirects every other request to the Python application
//!
//! It also stops on SIGTERM/SIGINT.

pub mod redirect;
mod server;
mod shutdown;

pub use server::{bind, serve_with_shutdown, ListenerState, ServerError};
pub use shutdown::shutdown_signal;
