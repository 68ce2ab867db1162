//! Reply bodies: command results and errors.

use serde_json::Value;

use crate::codec;
use crate::error::{CodecError, PayloadError};
use crate::names::FieldNames;
use crate::tree::PayloadTree;

/// Message sent back for malformed or unexpected requests.
pub const INTERNAL_COMMUNICATION_FAILED: &str = "Internal communication failed";

/// Message used when an error payload is built without one.
pub const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";

/// Status used when an error payload is built without one.
pub const DEFAULT_ERROR_STATUS: &str = "500 Internal Server Error";

/// Successful reply wrapping the converter's output under the command name.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResultPayload {
    tree: PayloadTree,
}

impl CommandResultPayload {
    /// Wraps `result` for the named command.
    #[must_use]
    pub fn new(name: &str, result: Value, names: FieldNames) -> Self {
        let mut tree = PayloadTree::new(names);
        tree.set("command/name", Value::from(name));
        tree.set("command/result", result);
        Self { tree }
    }

    /// Wraps a decoded tree.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::MissingCommandName`] when `command/name` is
    /// absent or not a string.
    pub fn from_tree(tree: PayloadTree) -> Result<Self, PayloadError> {
        if tree.get_str("command/name").is_none() {
            return Err(PayloadError::MissingCommandName);
        }
        Ok(Self { tree })
    }

    /// Name of the command this result answers.
    #[must_use]
    pub fn name(&self) -> &str {
        self.tree.get_str("command/name").unwrap_or_default()
    }

    /// The wrapped result, null when absent.
    #[must_use]
    pub fn result(&self) -> &Value {
        self.tree.get_or("command/result", &Value::Null)
    }

    /// Borrows the underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &PayloadTree {
        &self.tree
    }

    /// Encodes the reply body.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(&self.tree)
    }

    /// Decodes a reply body that must be a command result.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] for undecodable bytes or a missing name.
    pub fn decode(bytes: &[u8], names: FieldNames) -> Result<Self, PayloadError> {
        Self::from_tree(codec::decode(bytes, names)?)
    }
}

/// Error reply body.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    tree: PayloadTree,
}

impl ErrorPayload {
    /// Creates an error with the given message and the default status.
    #[must_use]
    pub fn new(message: &str, names: FieldNames) -> Self {
        let message = if message.is_empty() {
            DEFAULT_ERROR_MESSAGE
        } else {
            message
        };
        let mut tree = PayloadTree::new(names);
        tree.set("error/message", Value::from(message));
        tree.set("error/status", Value::from(DEFAULT_ERROR_STATUS));
        Self { tree }
    }

    /// The fixed reply for requests the worker could not understand.
    #[must_use]
    pub fn internal_communication_failed(names: FieldNames) -> Self {
        Self::new(INTERNAL_COMMUNICATION_FAILED, names)
    }

    /// Sets an application error code.
    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        self.tree.set("error/code", Value::from(code));
        self
    }

    /// Replaces the status line.
    #[must_use]
    pub fn with_status(mut self, status: &str) -> Self {
        self.tree.set("error/status", Value::from(status));
        self
    }

    /// Wraps a decoded tree carrying an `error` root.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::UnrecognisedReply`] when there is no `error`
    /// mapping.
    pub fn from_tree(tree: PayloadTree) -> Result<Self, PayloadError> {
        if tree.get_object("error").is_none() {
            return Err(PayloadError::UnrecognisedReply);
        }
        Ok(Self { tree })
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.tree
            .get_str("error/message")
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
    }

    /// Application error code, when set.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        self.tree.get_i64("error/code")
    }

    /// Status line.
    #[must_use]
    pub fn status(&self) -> &str {
        self.tree
            .get_str("error/status")
            .unwrap_or(DEFAULT_ERROR_STATUS)
    }

    /// Borrows the underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &PayloadTree {
        &self.tree
    }

    /// Releases the underlying tree.
    #[must_use]
    pub fn into_tree(self) -> PayloadTree {
        self.tree
    }

    /// Encodes the reply body.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(&self.tree)
    }
}

/// Either kind of reply body, as seen by a requester.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPayload {
    /// The command ran and produced a result.
    Result(CommandResultPayload),
    /// The worker answered with an error.
    Error(ErrorPayload),
}

impl ReplyPayload {
    /// Decodes a reply body, telling results from errors by the `error` root.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] for undecodable bytes or for a body that is
    /// neither shape.
    pub fn decode(bytes: &[u8], names: FieldNames) -> Result<Self, PayloadError> {
        let tree = codec::decode(bytes, names)?;
        if tree.exists("error") {
            return ErrorPayload::from_tree(tree).map(Self::Error);
        }
        CommandResultPayload::from_tree(tree)
            .map(Self::Result)
            .map_err(|_| PayloadError::UnrecognisedReply)
    }

    /// Encodes the reply body.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Result(result) => result.encode(),
            Self::Error(error) => error.encode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::codec::encode_value;

    #[rstest]
    #[case::verbose(FieldNames::Verbose)]
    #[case::compact(FieldNames::Compact)]
    fn results_keep_name_and_value(#[case] names: FieldNames) {
        let reply = CommandResultPayload::new("read", json!({"transport": {"data": {}}}), names);
        let bytes = reply.encode().expect("encode");

        let decoded = CommandResultPayload::decode(&bytes, names).expect("decode");
        assert_eq!(decoded.name(), "read");
        assert_eq!(decoded.result(), &json!({"transport": {"data": {}}}));
    }

    #[test]
    fn error_defaults() {
        let error = ErrorPayload::new("", FieldNames::Verbose);
        assert_eq!(error.message(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(error.status(), DEFAULT_ERROR_STATUS);
        assert_eq!(error.code(), None);
    }

    #[test]
    fn compact_errors_use_short_keys() {
        let error = ErrorPayload::internal_communication_failed(FieldNames::Compact).with_code(7);
        assert_eq!(
            error.tree().to_value(),
            json!({"E": {"m": INTERNAL_COMMUNICATION_FAILED, "s": DEFAULT_ERROR_STATUS, "c": 7}})
        );
    }

    #[rstest]
    #[case::verbose(FieldNames::Verbose)]
    #[case::compact(FieldNames::Compact)]
    fn reply_decoder_tells_kinds_apart(#[case] names: FieldNames) {
        let error = ErrorPayload::new("boom", names).with_status("400 Bad Request");
        let decoded = ReplyPayload::decode(&error.encode().expect("encode"), names)
            .expect("decode error");
        let ReplyPayload::Error(decoded) = decoded else {
            panic!("expected an error reply");
        };
        assert_eq!(decoded.message(), "boom");
        assert_eq!(decoded.status(), "400 Bad Request");

        let result = CommandResultPayload::new("read", json!(1), names);
        assert!(matches!(
            ReplyPayload::decode(&result.encode().expect("encode"), names),
            Ok(ReplyPayload::Result(_))
        ));
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        let bytes = encode_value(&json!({"other": 1})).expect("encode");
        assert!(matches!(
            ReplyPayload::decode(&bytes, FieldNames::Verbose),
            Err(PayloadError::UnrecognisedReply)
        ));
    }
}
