//! Error types for the reply socket.

use thiserror::Error;

/// Errors surfaced by reply socket operations. All of them are fatal to the
/// worker.
#[derive(Debug, Error)]
pub enum SocketError {
    /// Creating, configuring or connecting the socket failed.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Address that was dialled.
        endpoint: String,
        /// Underlying ZeroMQ error.
        #[source]
        source: zmq::Error,
    },
    /// Unix endpoints are not available on this platform.
    #[error("unix socket endpoints are unsupported: {endpoint}")]
    UnsupportedEndpoint {
        /// Endpoint that was requested.
        endpoint: String,
    },
    /// A send or receive failed.
    #[error("socket {operation} failed: {source}")]
    Zmq {
        /// Socket operation that failed.
        operation: &'static str,
        /// Underlying ZeroMQ error.
        #[source]
        source: zmq::Error,
    },
    /// The socket's context was terminated.
    #[error("socket context terminated during {operation}")]
    Closed {
        /// Socket operation that observed the termination.
        operation: &'static str,
    },
    /// No request arrived within the configured receive timeout.
    #[error("no request arrived within the receive timeout")]
    TimedOut,
    /// A reply part exceeds the message size ceiling; nothing was sent.
    #[error("{operation} of a {size} byte part exceeds the {max_size} byte limit")]
    TooLarge {
        /// Socket operation that was refused.
        operation: &'static str,
        /// Size of the offending part.
        size: usize,
        /// Configured ceiling.
        max_size: usize,
    },
    /// Send and receive were called out of order.
    #[error("cannot {operation} while {state}")]
    State {
        /// Operation that was attempted.
        operation: &'static str,
        /// Socket state at the time.
        state: &'static str,
    },
}

impl SocketError {
    /// Classifies a ZeroMQ error raised by `operation`.
    #[must_use]
    pub const fn from_zmq(operation: &'static str, source: zmq::Error) -> Self {
        match source {
            zmq::Error::ETERM => Self::Closed { operation },
            zmq::Error::EAGAIN => Self::TimedOut,
            _ => Self::Zmq { operation, source },
        }
    }

    /// Underlying ZeroMQ error, when there is one.
    #[must_use]
    pub const fn zmq_error(&self) -> Option<zmq::Error> {
        match self {
            Self::Connect { source, .. } | Self::Zmq { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// Returns `true` when the socket's context was terminated.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    /// Returns `true` when the receive timeout elapsed.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_contexts_are_closed() {
        assert!(SocketError::from_zmq("receive", zmq::Error::ETERM).is_closed());
    }

    #[test]
    fn would_block_means_the_timeout_elapsed() {
        assert!(SocketError::from_zmq("receive", zmq::Error::EAGAIN).is_timeout());
    }

    #[test]
    fn other_errors_keep_their_code() {
        let error = SocketError::from_zmq("send", zmq::Error::EFSM);
        assert_eq!(error.zmq_error(), Some(zmq::Error::EFSM));
        assert!(!error.is_closed());
    }
}
