//! Structured health reporting for worker lifecycle events.

use std::sync::Arc;

use bobbin_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;
use crate::server::ServerError;
use crate::socket::SocketError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before the worker dials its endpoint.
    fn socket_connecting(&self, endpoint: &SocketEndpoint);

    /// Invoked once the worker is connected and ready to serve.
    fn socket_connected(&self, endpoint: &SocketEndpoint);

    /// Invoked when connecting fails.
    fn socket_failed(&self, error: &SocketError);

    /// Invoked when the request loop ends.
    fn worker_stopped(&self, error: &ServerError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn socket_connecting(&self, endpoint: &SocketEndpoint) {
        (**self).socket_connecting(endpoint);
    }

    fn socket_connected(&self, endpoint: &SocketEndpoint) {
        (**self).socket_connected(endpoint);
    }

    fn socket_failed(&self, error: &SocketError) {
        (**self).socket_failed(error);
    }

    fn worker_stopped(&self, error: &ServerError) {
        (**self).worker_stopped(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting worker bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            component = config.component(),
            version = config.version(),
            framework_version = config.framework_version(),
            compact_names = config.compact_names(),
            socket = %config.socket_endpoint(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "worker bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "worker bootstrap failed"
        );
    }

    fn socket_connecting(&self, endpoint: &SocketEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "socket_connecting",
            endpoint = %endpoint,
            "connecting to requester"
        );
    }

    fn socket_connected(&self, endpoint: &SocketEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "socket_connected",
            endpoint = %endpoint,
            "worker ready for requests"
        );
    }

    fn socket_failed(&self, error: &SocketError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "socket_failed",
            error = %error,
            "failed to connect to requester"
        );
    }

    fn worker_stopped(&self, error: &ServerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "worker_stopped",
            error = %error,
            "request loop stopped"
        );
    }
}
