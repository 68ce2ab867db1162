//! The component server loop.
//!
//! A [`ComponentServer`] answers one request at a time:
//!
//! 1. receive a three-frame request (`action`, `mappings`, `stream`);
//! 2. decode `stream` into a [`CommandPayload`];
//! 3. build a component instance, run the callback against it, and convert
//!    the outcome into a payload;
//! 4. wrap that payload in a [`CommandResultPayload`] and send it back with
//!    the classified meta byte.
//!
//! Nothing that happens while handling a request stops the loop. Malformed
//! requests get the fixed "Internal communication failed" error, callback
//! errors or panics are handed to the component kind's error hook, and a
//! result too large to send is replaced by an error payload. Only socket
//! failures end [`ComponentServer::run`].

mod errors;
mod request;
mod response;

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use bobbin_payload::{
    CommandDecoder, CommandPayload, CommandResultPayload, ErrorPayload, FieldNames, PayloadTree,
};

use crate::component::{Callback, ComponentKind, EmptyMeta, MetaClassifier, Outcome};
use crate::error::{CallbackError, panic_message};
use crate::socket::{MAX_MESSAGE_SIZE, ReplySocket};

pub use self::errors::{RequestError, ServerError};
pub use self::response::Reply;

use self::request::RequestFrames;

pub(crate) const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Request loop binding a component kind, a callback, and a meta classifier.
#[derive(Debug)]
pub struct ComponentServer<K, C, M = EmptyMeta> {
    kind: K,
    callback: C,
    classifier: M,
    decoder: CommandDecoder,
    max_reply_size: usize,
}

impl<K, C> ComponentServer<K, C, EmptyMeta> {
    /// Creates a server that always replies with the empty meta byte.
    #[must_use]
    pub const fn new(kind: K, callback: C, names: FieldNames) -> Self {
        Self {
            kind,
            callback,
            classifier: EmptyMeta,
            decoder: CommandDecoder::new(names),
            max_reply_size: MAX_MESSAGE_SIZE,
        }
    }
}

impl<K, C, M> ComponentServer<K, C, M> {
    /// Replaces the meta classifier.
    #[must_use]
    pub fn with_classifier<N>(self, classifier: N) -> ComponentServer<K, C, N> {
        ComponentServer {
            kind: self.kind,
            callback: self.callback,
            classifier,
            decoder: self.decoder,
            max_reply_size: self.max_reply_size,
        }
    }

    /// Caps the encoded reply body; larger results are answered with an
    /// error payload instead.
    #[must_use]
    pub const fn with_max_reply_size(mut self, max_reply_size: usize) -> Self {
        self.max_reply_size = max_reply_size;
        self
    }

    /// Naming mode used to decode requests and encode replies.
    #[must_use]
    pub const fn names(&self) -> FieldNames {
        self.decoder.names()
    }
}

impl<K, C, M> ComponentServer<K, C, M>
where
    K: ComponentKind,
    C: Callback<K::Instance>,
    M: MetaClassifier,
{
    /// Serves requests until the socket fails.
    ///
    /// # Errors
    ///
    /// Returns the first socket failure; this is the only way the loop ends.
    pub fn run(&self, socket: &mut ReplySocket) -> Result<(), ServerError> {
        loop {
            self.serve_one(socket)?;
        }
    }

    /// Receives one request and sends its reply.
    ///
    /// The reply body is kept within both the server's reply limit and the
    /// socket's message size ceiling.
    ///
    /// # Errors
    ///
    /// Returns a [`ServerError`] when the socket fails.
    pub fn serve_one(&self, socket: &mut ReplySocket) -> Result<(), ServerError> {
        let parts = socket.recv_multipart()?;
        let reply = self.respond(&parts, self.max_reply_size.min(socket.max_message_size()));
        reply.send(socket)?;
        Ok(())
    }

    /// Turns the frames of one request into its reply.
    #[must_use]
    pub fn process(&self, parts: &[Vec<u8>]) -> Reply {
        self.respond(parts, self.max_reply_size)
    }

    fn respond(&self, parts: &[Vec<u8>], max_size: usize) -> Reply {
        let command = match self.decode(parts) {
            Ok(command) => command,
            Err(error) => {
                warn!(
                    target: SERVER_TARGET,
                    error = %error,
                    "rejecting malformed request"
                );
                return Reply::communication_failure(self.names(), max_size);
            }
        };

        let meta = self.classifier.classify(&command);
        let result = self.dispatch_guarded(&command);
        let payload = CommandResultPayload::new(command.name(), result.into_value(), self.names());
        Reply::result(meta, &payload, self.names(), max_size)
    }

    fn decode(&self, parts: &[Vec<u8>]) -> Result<CommandPayload, RequestError> {
        let frames = RequestFrames::parse(parts)?;
        debug!(
            target: SERVER_TARGET,
            action = %frames.action(),
            mappings_len = frames.mappings_len(),
            stream_len = frames.stream().len(),
            "request received"
        );
        Ok(self.decoder.decode(frames.stream())?)
    }

    fn dispatch_guarded(&self, command: &CommandPayload) -> PayloadTree {
        panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(command))).unwrap_or_else(|payload| {
            let message = panic_message(&*payload);
            warn!(
                target: SERVER_TARGET,
                command = command.name(),
                panic = %message,
                "component hook panicked"
            );
            ErrorPayload::new(&message, self.names()).into_tree()
        })
    }

    fn dispatch(&self, command: &CommandPayload) -> PayloadTree {
        let outcome = match self.kind.create_component_instance(command) {
            Ok(mut instance) => {
                match panic::catch_unwind(AssertUnwindSafe(|| self.callback.call(&mut instance))) {
                    Ok(Ok(())) => Outcome::Component(instance),
                    Ok(Err(error)) => self.fail(&error, Some(&instance), command),
                    Err(payload) => {
                        self.fail(&CallbackError::panicked(&*payload), Some(&instance), command)
                    }
                }
            }
            Err(source) => self.fail(&CallbackError::factory(source), None, command),
        };
        self.kind.component_to_payload(command.name(), outcome)
    }

    fn fail(
        &self,
        error: &CallbackError,
        instance: Option<&K::Instance>,
        command: &CommandPayload,
    ) -> Outcome<K::Instance> {
        warn!(
            target: SERVER_TARGET,
            command = command.name(),
            error = %error,
            "callback failed"
        );
        Outcome::Payload(self.kind.create_error_payload(error, instance, command))
    }
}
