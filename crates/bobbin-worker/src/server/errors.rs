//! Error types for the component server loop.

use thiserror::Error;

use bobbin_payload::PayloadError;

use crate::socket::SocketError;

/// Fatal failures that stop the server loop.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The reply socket failed.
    #[error(transparent)]
    Socket(#[from] SocketError),
}

/// Reasons a request is answered with the fixed communication error.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request did not have exactly three frames.
    #[error("expected 3 request frames, received {received}")]
    FrameCount {
        /// Number of frames received.
        received: usize,
    },
    /// The command frame could not be decoded.
    #[error("malformed command payload: {0}")]
    Payload(#[from] PayloadError),
}
