//! Test harness utilities shared by the worker suites.

use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use ortho_config::{OrthoConfig, OrthoError};

use bobbin_config::{Config, SocketEndpoint};

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::health::HealthReporter;
use crate::server::ServerError;
use crate::socket::SocketError;

/// Idle timeout given to test workers so their loops end on their own.
pub const IDLE_TIMEOUT_MS: u64 = 1_000;

/// Builds a valid configuration pointing at `endpoint`.
pub fn config_for(endpoint: SocketEndpoint) -> Config {
    Config {
        component: "users".to_owned(),
        version: "1.0".to_owned(),
        disable_compact_names: true,
        socket: Some(endpoint),
        idle_timeout_ms: Some(IDLE_TIMEOUT_MS),
        log_format: bobbin_config::LogFormat::Compact,
        ..Config::default()
    }
}

/// Loader that intentionally fails by passing an unsupported endpoint.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("bobbin-worker"),
            OsString::from("--socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}

/// Records health events for assertions.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn socket_connecting(&self, endpoint: &SocketEndpoint) {
        self.record(HealthEvent::SocketConnecting(endpoint.to_string()));
    }

    fn socket_connected(&self, endpoint: &SocketEndpoint) {
        self.record(HealthEvent::SocketConnected(endpoint.to_string()));
    }

    fn socket_failed(&self, error: &SocketError) {
        self.record(HealthEvent::SocketFailed(error.to_string()));
    }

    fn worker_stopped(&self, error: &ServerError) {
        self.record(HealthEvent::WorkerStopped(error.to_string()));
    }
}

/// Structured health events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The worker started dialling an endpoint.
    SocketConnecting(String),
    /// The worker connected to an endpoint.
    SocketConnected(String),
    /// Connecting failed with an error description.
    SocketFailed(String),
    /// The request loop stopped with an error description.
    WorkerStopped(String),
}

/// Requester side of the protocol: a `REQ` socket the worker connects to.
pub struct Requester {
    socket: zmq::Socket,
    endpoint: SocketEndpoint,
}

impl Requester {
    /// Binds an ephemeral loopback port.
    pub fn bind() -> Self {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::REQ).expect("requester socket");
        socket.set_linger(0).expect("requester linger");
        socket.set_rcvtimeo(5_000).expect("requester receive timeout");
        socket.bind("tcp://127.0.0.1:*").expect("bind requester");
        let address = socket
            .get_last_endpoint()
            .expect("requester address")
            .expect("utf-8 address");
        let port = address
            .rsplit(':')
            .next()
            .and_then(|port| port.parse().ok())
            .expect("bound port");
        Self {
            socket,
            endpoint: SocketEndpoint::tcp("127.0.0.1", port),
        }
    }

    /// Endpoint a worker should connect to.
    pub fn endpoint(&self) -> SocketEndpoint {
        self.endpoint.clone()
    }

    /// Sends one request and waits for the whole reply.
    pub fn request(&self, parts: &[&[u8]]) -> Vec<Vec<u8>> {
        self.socket
            .send_multipart(parts.iter().copied(), 0)
            .expect("send request");
        self.socket.recv_multipart(0).expect("read reply")
    }
}
