//! Reply socket connecting a worker to its requester.
//!
//! The worker connects a ZeroMQ `REP` socket to the configured endpoint (see
//! [`zmq_address`]) and answers each multipart request with exactly one
//! multipart reply. [`ReplySocket`] keeps that alternation explicit and
//! refuses to receive again until the current request has been answered.
//!
//! Every failure is logged with the operation, the ZeroMQ error code and
//! description, and a captured backtrace before it is returned. The server
//! loop treats all of them as fatal.

mod endpoint;
mod errors;
mod reply;

use std::backtrace::Backtrace;

use tracing::error;

pub use self::endpoint::zmq_address;
pub use self::errors::SocketError;
pub use self::reply::{MAX_MESSAGE_SIZE, ReplySocket, SocketOptions};

const SOCKET_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::socket");

pub(crate) fn log_failure(failure: SocketError) -> SocketError {
    let zmq_error = failure.zmq_error();
    error!(
        target: SOCKET_TARGET,
        error = %failure,
        code = ?zmq_error.map(zmq::Error::to_raw),
        description = ?zmq_error.map(zmq::Error::message),
        backtrace = %Backtrace::force_capture(),
        "socket operation failed"
    );
    failure
}
