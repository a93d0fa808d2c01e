//! Bootstrap pipeline.
//!
//! Runs the launcher's phases strictly in order:
//!
//! ```text
//! Checking -> Installing (only if something is missing) -> Launching -> Serving
//! ```
//!
//! None of the phases before `Serving` can fail the pipeline: listing and
//! install problems are logged, and an application that fails to start is
//! logged while the health listener still comes up. Only a listener that
//! cannot bind ends the run with an error.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{AppConfig, PackagesConfig};
use crate::error::AppError;
use crate::http;
use crate::packages::{self, InstallOutcome};
use crate::routes::create_router;
use crate::state::AppState;
use crate::toolchain::{SystemToolchain, Toolchain};

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Checking,
    Installing,
    Launching,
    Serving,
}

/// What happened before the listener started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub missing: Vec<String>,
    pub install: InstallOutcome,
    /// Application pid, `None` if it could not be started
    pub app_pid: Option<u32>,
    /// Phases entered, in order
    pub phases: Vec<Phase>,
}

impl BootstrapReport {
    pub fn app_started(&self) -> bool {
        self.app_pid.is_some()
    }
}

/// Drives the phases up to (not including) `Serving`.
pub struct Bootstrap<'a> {
    toolchain: &'a dyn Toolchain,
    packages: &'a PackagesConfig,
}

impl<'a> Bootstrap<'a> {
    pub fn new(toolchain: &'a dyn Toolchain, packages: &'a PackagesConfig) -> Self {
        Self {
            toolchain,
            packages,
        }
    }

    /// Check, install if needed, then launch the application.
    pub async fn prepare(&self) -> BootstrapReport {
        let mut phases = vec![Phase::Checking];
        tracing::info!(phase = ?Phase::Checking, "Checking required packages");
        let missing = packages::check(
            self.toolchain,
            &self.packages.required,
            self.packages.match_mode,
        )
        .await;

        if !missing.is_empty() {
            phases.push(Phase::Installing);
        }
        let install = packages::install_missing(self.toolchain, &missing).await;

        phases.push(Phase::Launching);
        tracing::info!(phase = ?Phase::Launching, "Launching application");
        let app_pid = match self.toolchain.launch_app().await {
            Ok(pid) => pid,
            Err(e) => {
                tracing::error!(error = %e, "Application failed to start, serving health check only");
                None
            }
        };

        BootstrapReport {
            missing,
            install,
            app_pid,
            phases,
        }
    }
}

/// A bootstrapped launcher whose listener is bound but not yet serving.
pub struct Started {
    pub report: BootstrapReport,
    listener: TcpListener,
    app: Router,
}

impl Started {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `signal` resolves.
    pub async fn serve_until<F>(self, signal: F) -> Result<(), AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        http::serve_with_shutdown(self.listener, self.app, signal).await?;
        Ok(())
    }
}

/// Bootstrap the application, then bind the listener.
///
/// The listener socket is only bound once the launch has been attempted, so a
/// port conflict is reported after the application was already started.
pub async fn start(toolchain: &dyn Toolchain, config: &AppConfig) -> Result<Started, AppError> {
    let mut report = Bootstrap::new(toolchain, &config.packages).prepare().await;
    tracing::debug!(report = ?report, "Bootstrap finished");

    report.phases.push(Phase::Serving);
    tracing::info!(
        phase = ?Phase::Serving,
        port = config.http.port,
        upstream = %config.upstream.base_url(),
        "Starting health/redirect listener"
    );
    let listener = http::bind(&config.http.host, config.http.port).await?;
    let app = create_router(AppState::new(config));

    Ok(Started {
        report,
        listener,
        app,
    })
}

/// Run the whole launcher: bootstrap the application, then serve until signalled.
pub async fn run(config: &AppConfig) -> Result<(), AppError> {
    let toolchain = SystemToolchain::new(&config.packages, &config.app);
    start(&toolchain, config)
        .await?
        .serve_until(http::shutdown_signal())
        .await
}
