//! Mapping from configured endpoints to ZeroMQ addresses.

use bobbin_config::SocketEndpoint;

use super::errors::SocketError;

/// Renders `endpoint` as the address a ZeroMQ socket connects to.
///
/// TCP endpoints become `tcp://host:port` and Unix endpoints become
/// `ipc://path`.
///
/// # Errors
///
/// Returns [`SocketError::UnsupportedEndpoint`] for Unix endpoints on
/// platforms without Unix sockets.
pub fn zmq_address(endpoint: &SocketEndpoint) -> Result<String, SocketError> {
    match endpoint {
        SocketEndpoint::Tcp { host, port } => Ok(format!("tcp://{host}:{port}")),
        SocketEndpoint::Unix { path } => {
            #[cfg(unix)]
            {
                Ok(format!("ipc://{path}"))
            }

            #[cfg(not(unix))]
            {
                let _ = path;
                Err(super::log_failure(SocketError::UnsupportedEndpoint {
                    endpoint: endpoint.to_string(),
                }))
            }
        }
    }
}
