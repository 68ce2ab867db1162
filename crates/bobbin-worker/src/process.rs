//! Process entry point for service workers.

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

use crate::action::Action;
use crate::bootstrap::{BootstrapError, ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::component::Callback;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::server::ServerError;

/// Errors that end a worker process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The worker could not start.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The request loop stopped.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Bootstraps a service worker and serves `callback` until the socket fails.
///
/// Configuration comes from the usual layers (defaults, `bobbin.toml`,
/// `BOBBIN_*` variables, command-line flags). Failures are reported through
/// structured telemetry and turned into a failing exit code.
pub fn run_service<C>(callback: C) -> ExitCode
where
    C: Callback<Action>,
{
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    match run_service_with(&SystemConfigLoader, reporter, callback) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

/// Runs a service worker with injected collaborators.
///
/// # Errors
///
/// Returns [`LaunchError::Bootstrap`] when the worker cannot start and
/// [`LaunchError::Server`] once the request loop stops.
pub fn run_service_with<C>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    callback: C,
) -> Result<(), LaunchError>
where
    C: Callback<Action>,
{
    let worker = bootstrap_with(loader, reporter)?;
    worker.serve(callback)?;
    Ok(())
}
