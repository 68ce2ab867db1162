//! Reply encoding for the server loop.
//!
//! A reply is always two frames: the one-byte [`ResponseMeta`] and a msgpack
//! body. Encoding never fails outright: a body that cannot be encoded, or that
//! exceeds the reply size limit, is replaced by an encoded [`ErrorPayload`], so
//! the requester still receives a well-formed reply.

use tracing::warn;

use bobbin_payload::{CommandResultPayload, ErrorPayload, FieldNames};

use crate::component::ResponseMeta;
use crate::socket::{ReplySocket, SocketError};

use super::SERVER_TARGET;

/// msgpack encoding of an empty map, the last-resort body.
const EMPTY_BODY: [u8; 1] = [0x80];

/// An encoded two-frame reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    meta: ResponseMeta,
    body: Vec<u8>,
}

impl Reply {
    /// Encodes a command result whose body may not exceed `max_size` bytes.
    #[must_use]
    pub fn result(
        meta: ResponseMeta,
        payload: &CommandResultPayload,
        names: FieldNames,
        max_size: usize,
    ) -> Self {
        let message = match payload.encode() {
            Ok(body) if body.len() <= max_size => return Self { meta, body },
            Ok(body) => {
                warn!(
                    target: SERVER_TARGET,
                    command = payload.name(),
                    size = body.len(),
                    max_size,
                    "command result exceeds the reply size limit; sending an error payload instead"
                );
                format!("reply body of {} bytes exceeds the {max_size} byte limit", body.len())
            }
            Err(error) => {
                warn!(
                    target: SERVER_TARGET,
                    command = payload.name(),
                    error = %error,
                    "failed to encode command result; sending an error payload instead"
                );
                error.to_string()
            }
        };
        Self::error(meta, &ErrorPayload::new(&message, names), max_size)
    }

    /// Encodes an error payload whose body may not exceed `max_size` bytes.
    #[must_use]
    pub fn error(meta: ResponseMeta, payload: &ErrorPayload, max_size: usize) -> Self {
        let body = match payload.encode() {
            Ok(body) if body.len() <= max_size => body,
            Ok(body) => {
                warn!(
                    target: SERVER_TARGET,
                    size = body.len(),
                    max_size,
                    "error payload exceeds the reply size limit; sending an empty body"
                );
                EMPTY_BODY.to_vec()
            }
            Err(error) => {
                warn!(
                    target: SERVER_TARGET,
                    error = %error,
                    "failed to encode error payload; sending an empty body"
                );
                EMPTY_BODY.to_vec()
            }
        };
        Self { meta, body }
    }

    /// The fixed reply for requests the worker could not understand.
    #[must_use]
    pub fn communication_failure(names: FieldNames, max_size: usize) -> Self {
        Self::error(
            ResponseMeta::Empty,
            &ErrorPayload::internal_communication_failed(names),
            max_size,
        )
    }

    /// Reply meta.
    #[must_use]
    pub const fn meta(&self) -> ResponseMeta {
        self.meta
    }

    /// Encoded reply body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Writes both frames to the socket.
    ///
    /// # Errors
    ///
    /// Returns any socket failure.
    pub fn send(&self, socket: &mut ReplySocket) -> Result<(), SocketError> {
        socket.send_multipart(&[&[self.meta.as_byte()], &self.body])
    }
}
