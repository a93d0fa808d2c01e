//! Installation of missing packages.

use crate::toolchain::Toolchain;

/// What the install step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Nothing was missing, the installer was not run
    Skipped,
    /// The installer ran; the exit code is informational only
    Completed { code: Option<i32> },
}

impl InstallOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(
            self,
            InstallOutcome::Skipped | InstallOutcome::Completed { code: Some(0) }
        )
    }
}

/// Install `missing` packages if there are any.
///
/// Never fails: a failing installer is logged and the caller carries on.
pub async fn install_missing(toolchain: &dyn Toolchain, missing: &[String]) -> InstallOutcome {
    if missing.is_empty() {
        tracing::debug!("No packages to install");
        return InstallOutcome::Skipped;
    }

    tracing::info!(packages = %missing.join(", "), "Installing missing packages");
    let code = toolchain.install_packages(missing).await;
    let outcome = InstallOutcome::Completed { code };

    if outcome.succeeded() {
        tracing::info!(code = ?code, "Package installation completed");
    } else {
        tracing::warn!(code = ?code, "Package installation completed unsuccessfully, continuing");
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_succeeded() {
        assert!(InstallOutcome::Skipped.succeeded());
        assert!(InstallOutcome::Completed { code: Some(0) }.succeeded());
        assert!(!InstallOutcome::Completed { code: Some(1) }.succeeded());
        assert!(!InstallOutcome::Completed { code: None }.succeeded());
    }
}
