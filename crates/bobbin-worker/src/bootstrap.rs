//! Worker bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use bobbin_config::{Config, ConfigError};

use crate::action::Action;
use crate::component::{Callback, ComponentKind, MetaClassifier};
use crate::health::HealthReporter;
use crate::server::{ComponentServer, ServerError};
use crate::service::ServiceComponent;
use crate::socket::{ReplySocket, SocketError, SocketOptions, zmq_address};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the worker configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration built in code.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps a ready-made configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but cannot run a worker.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// Validation failure.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Worker {
    config: Config,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
    context: zmq::Context,
}

impl Worker {
    fn new(
        config: Config,
        telemetry: TelemetryHandle,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            config,
            telemetry,
            reporter,
            context: zmq::Context::new(),
        }
    }

    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Connects a reply socket to the configured endpoint.
    ///
    /// The socket uses the configured idle timeout, if any.
    ///
    /// # Errors
    ///
    /// Returns the [`SocketError`] raised while connecting.
    pub fn connect(&self) -> Result<ReplySocket, SocketError> {
        let endpoint = self.config.socket_endpoint();
        self.reporter.socket_connecting(&endpoint);
        let options = SocketOptions::new().with_receive_timeout(self.config.idle_timeout());
        let connected = zmq_address(&endpoint)
            .and_then(|address| ReplySocket::connect(&self.context, &address, options));
        match connected {
            Ok(socket) => {
                self.reporter.socket_connected(&endpoint);
                Ok(socket)
            }
            Err(error) => {
                self.reporter.socket_failed(&error);
                Err(error)
            }
        }
    }

    /// Serves the configured service component with `callback` until the
    /// socket fails.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`ServerError`] that ended the loop.
    pub fn serve<C>(&self, callback: C) -> Result<(), ServerError>
    where
        C: Callback<Action>,
    {
        let kind = ServiceComponent::from_config(&self.config);
        let names = kind.names();
        self.serve_with(&ComponentServer::new(kind, callback, names))
    }

    /// Connects and runs an arbitrary component server.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`ServerError`] that ended the loop.
    pub fn serve_with<K, C, M>(&self, server: &ComponentServer<K, C, M>) -> Result<(), ServerError>
    where
        K: ComponentKind,
        C: Callback<K::Instance>,
        M: MetaClassifier,
    {
        let mut socket = self.connect()?;
        server
            .run(&mut socket)
            .inspect_err(|error| self.reporter.worker_stopped(error))
    }
}

/// Bootstraps the worker using the supplied collaborators.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when configuration cannot be loaded or
/// validated, or when telemetry cannot be installed. Every failure is also
/// passed to the reporter.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Worker, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    if let Err(source) = config.validate() {
        let error = BootstrapError::Invalid { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Worker::new(config, telemetry, reporter))
}
