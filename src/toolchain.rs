//! The external collaborators the launcher drives.
//!
//! [`Toolchain`] is the seam between the bootstrap pipeline and the outside
//! world: the package manager (listing and installing) and the application
//! entry point. [`SystemToolchain`] runs the real commands.

use async_trait::async_trait;

use crate::config::{LaunchConfig, PackagesConfig};
use crate::error::AppError;
use crate::process::{self, CommandSpec};

#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Raw output of the package listing command.
    ///
    /// Never fails: a listing that cannot be produced is reported as whatever
    /// was captured, usually the empty string.
    async fn list_packages(&self) -> String;

    /// Install `packages`, returning the installer's exit code.
    ///
    /// `None` means no exit code is available (spawn failure or signal).
    async fn install_packages(&self, packages: &[String]) -> Option<i32>;

    /// Start the application and return its process id.
    async fn launch_app(&self) -> Result<Option<u32>, AppError>;
}

/// Runs the configured package manager and application on this machine.
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    list: CommandSpec,
    install: CommandSpec,
    app: CommandSpec,
}

impl SystemToolchain {
    pub fn new(packages: &PackagesConfig, app: &LaunchConfig) -> Self {
        Self {
            list: CommandSpec::new(packages.manager.clone(), packages.list_args.clone()),
            install: CommandSpec::new(packages.manager.clone(), packages.install_args.clone()),
            app: CommandSpec::new(app.program.clone(), app.args.clone())
                .with_working_dir(app.working_dir.clone()),
        }
    }
}

#[async_trait]
impl Toolchain for SystemToolchain {
    async fn list_packages(&self) -> String {
        match process::capture(&self.list).await {
            Ok(output) => {
                if output.code != Some(0) {
                    tracing::warn!(
                        command = %self.list,
                        code = ?output.code,
                        stderr = %output.stderr.trim(),
                        "Package listing exited unsuccessfully, using captured output"
                    );
                }
                output.stdout
            }
            Err(e) => {
                tracing::warn!(
                    command = %self.list,
                    error = %e,
                    "Failed to run package listing, treating as no packages installed"
                );
                String::new()
            }
        }
    }

    async fn install_packages(&self, packages: &[String]) -> Option<i32> {
        let command = self.install.clone().with_extra_args(packages);
        match process::run_relayed(&command).await {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(command = %command, error = %e, "Failed to run package installer");
                None
            }
        }
    }

    async fn launch_app(&self) -> Result<Option<u32>, AppError> {
        let launched =
            process::launch(&self.app).map_err(|e| AppError::spawn(self.app.program.clone(), e))?;
        tracing::info!(command = %self.app, pid = ?launched.pid, "Started application process");
        Ok(launched.pid)
    }
}
