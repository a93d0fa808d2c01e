//! Python dependency management: detect missing packages, install them.

pub mod checker;
pub mod installer;

pub use checker::{check, missing_packages};
pub use installer::{install_missing, InstallOutcome};
