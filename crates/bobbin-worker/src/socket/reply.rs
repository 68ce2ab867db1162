//! Reply socket enforcing strict request/reply alternation.

use std::time::Duration;

use super::errors::SocketError;
use super::log_failure;

/// Default ceiling for a single message part, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingRequest,
    Replying,
}

impl State {
    const fn describe(self) -> &'static str {
        match self {
            Self::AwaitingRequest => "awaiting a request",
            Self::Replying => "a reply is pending",
        }
    }
}

/// Options applied to the socket before it connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketOptions {
    max_message_size: usize,
    receive_timeout: Option<Duration>,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketOptions {
    /// Options with the default size ceiling and no receive timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            receive_timeout: None,
        }
    }

    /// Overrides the largest accepted or sent message part.
    #[must_use]
    pub const fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.max_message_size = max_message_size;
        self
    }

    /// Gives up receiving once `timeout` passes without a request.
    #[must_use]
    pub const fn with_receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Largest accepted or sent message part.
    #[must_use]
    pub const fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Receive timeout, if any.
    #[must_use]
    pub const fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout
    }
}

/// ZeroMQ `REP` socket connected to the requester.
///
/// Each multipart request received must be answered by exactly one multipart
/// reply before the next request can be read.
pub struct ReplySocket {
    socket: zmq::Socket,
    state: State,
    max_message_size: usize,
}

impl std::fmt::Debug for ReplySocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplySocket")
            .field("state", &self.state)
            .field("max_message_size", &self.max_message_size)
            .finish_non_exhaustive()
    }
}

impl ReplySocket {
    /// Creates a `REP` socket in `context` and connects it to `address`.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::Connect`] when the socket cannot be created,
    /// configured or connected. The failure is logged before it is returned.
    pub fn connect(
        context: &zmq::Context,
        address: &str,
        options: SocketOptions,
    ) -> Result<Self, SocketError> {
        let connect_error = |source: zmq::Error| {
            log_failure(SocketError::Connect {
                endpoint: address.to_owned(),
                source,
            })
        };
        let socket = context.socket(zmq::REP).map_err(connect_error)?;
        socket.set_linger(0).map_err(connect_error)?;
        socket
            .set_maxmsgsize(i64::try_from(options.max_message_size).unwrap_or(i64::MAX))
            .map_err(connect_error)?;
        if let Some(timeout) = options.receive_timeout {
            socket
                .set_rcvtimeo(i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX))
                .map_err(connect_error)?;
        }
        socket.connect(address).map_err(connect_error)?;
        Ok(Self {
            socket,
            state: State::AwaitingRequest,
            max_message_size: options.max_message_size,
        })
    }

    /// Largest message part this socket accepts or sends.
    #[must_use]
    pub const fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Blocks until a whole multipart request arrives.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::State`] when a reply is still pending,
    /// [`SocketError::TimedOut`] when the receive timeout elapses, and any
    /// ZeroMQ failure otherwise. Failures are logged before they are returned.
    pub fn recv_multipart(&mut self) -> Result<Vec<Vec<u8>>, SocketError> {
        const OPERATION: &str = "receive";
        self.expect_state(OPERATION, State::AwaitingRequest)?;
        let parts = self
            .socket
            .recv_multipart(0)
            .map_err(|error| log_failure(SocketError::from_zmq(OPERATION, error)))?;
        self.state = State::Replying;
        Ok(parts)
    }

    /// Sends every part of a reply as one multipart message.
    ///
    /// Part sizes are checked before anything is handed to ZeroMQ, so an
    /// oversized part never leaves a partial reply behind.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::State`] when no request is pending,
    /// [`SocketError::TooLarge`] when a part exceeds the ceiling, and any
    /// ZeroMQ failure otherwise.
    pub fn send_multipart(&mut self, parts: &[&[u8]]) -> Result<(), SocketError> {
        const OPERATION: &str = "send";
        self.expect_state(OPERATION, State::Replying)?;
        if let Some(part) = parts.iter().find(|part| part.len() > self.max_message_size) {
            return Err(log_failure(SocketError::TooLarge {
                operation: OPERATION,
                size: part.len(),
                max_size: self.max_message_size,
            }));
        }
        self.socket
            .send_multipart(parts.iter().copied(), 0)
            .map_err(|error| log_failure(SocketError::from_zmq(OPERATION, error)))?;
        self.state = State::AwaitingRequest;
        Ok(())
    }

    fn expect_state(&self, operation: &'static str, expected: State) -> Result<(), SocketError> {
        if self.state == expected {
            return Ok(());
        }
        Err(log_failure(SocketError::State {
            operation,
            state: self.state.describe(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        requester: zmq::Socket,
        socket: ReplySocket,
    }

    fn pair(name: &str, options: SocketOptions) -> Pair {
        let context = zmq::Context::new();
        let address = format!("inproc://{name}");
        let requester = context.socket(zmq::REQ).expect("requester socket");
        requester.bind(&address).expect("bind requester");
        requester.set_rcvtimeo(5_000).expect("requester receive timeout");
        let socket = ReplySocket::connect(&context, &address, options).expect("connect");
        Pair { requester, socket }
    }

    #[test]
    fn receives_whole_multipart_messages() {
        let mut pair = pair("receive-whole", SocketOptions::new());
        let request: [&[u8]; 3] = [b"read", b"", b"body"];
        pair.requester.send_multipart(request, 0).expect("request");

        let parts = pair.socket.recv_multipart().expect("receive");
        assert_eq!(parts, vec![b"read".to_vec(), Vec::new(), b"body".to_vec()]);
    }

    #[test]
    fn replies_reach_the_requester_whole() {
        let mut pair = pair("reply-whole", SocketOptions::new());
        pair.requester.send("x", 0).expect("request");
        pair.socket.recv_multipart().expect("receive");
        pair.socket.send_multipart(&[&[0x00], b"reply"]).expect("send");

        let reply = pair.requester.recv_multipart(0).expect("reply");
        assert_eq!(reply, vec![vec![0x00], b"reply".to_vec()]);
    }

    #[test]
    fn sending_before_receiving_is_rejected() {
        let mut pair = pair("send-early", SocketOptions::new());
        assert!(matches!(
            pair.socket.send_multipart(&[b"early"]),
            Err(SocketError::State { operation: "send", .. })
        ));
    }

    #[test]
    fn receiving_twice_is_rejected() {
        let mut pair = pair("receive-twice", SocketOptions::new());
        pair.requester.send("one", 0).expect("request");
        pair.socket.recv_multipart().expect("first receive");
        assert!(matches!(
            pair.socket.recv_multipart(),
            Err(SocketError::State { operation: "receive", .. })
        ));
    }

    #[test]
    fn oversized_parts_are_refused_before_anything_is_sent() {
        let mut pair = pair("oversized", SocketOptions::new().with_max_message_size(8));
        pair.requester.send("x", 0).expect("request");
        pair.socket.recv_multipart().expect("receive");

        let error = pair
            .socket
            .send_multipart(&[&[0x00], &[0xAB; 16]])
            .expect_err("part exceeds the ceiling");
        assert!(matches!(
            error,
            SocketError::TooLarge {
                size: 16,
                max_size: 8,
                ..
            }
        ));
        assert_eq!(
            pair.requester.recv_multipart(zmq::DONTWAIT),
            Err(zmq::Error::EAGAIN),
            "no partial reply may reach the requester"
        );

        pair.socket
            .send_multipart(&[&[0x00], b"small"])
            .expect("a reply is still owed");
        let reply = pair.requester.recv_multipart(0).expect("reply");
        assert_eq!(reply, vec![vec![0x00], b"small".to_vec()]);
    }

    #[test]
    fn idle_sockets_time_out() {
        let mut pair = pair(
            "idle",
            SocketOptions::new().with_receive_timeout(Some(Duration::from_millis(20))),
        );
        let error = pair.socket.recv_multipart().expect_err("nothing was sent");
        assert!(error.is_timeout());
    }
}
