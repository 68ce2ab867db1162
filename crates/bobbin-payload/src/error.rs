//! Errors raised while building, reading, or coding payloads.

use thiserror::Error;

use crate::kind::ValueKind;

/// Errors raised by payload construction and access.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// A payload root (or a region that must be a mapping) held another kind.
    #[error("expected a mapping but found {found}")]
    NotAMapping {
        /// Kind of the value that was found.
        found: ValueKind,
    },

    /// The command payload carried no `command/name`.
    #[error("command payload has no command name")]
    MissingCommandName,

    /// A reply payload carried neither a command result nor an error.
    #[error("reply payload is neither a command result nor an error")]
    UnrecognisedReply,

    /// A transport property was given a non-string value.
    #[error("property '{name}' must be a string, got {found}")]
    PropertyType {
        /// Property name.
        name: String,
        /// Kind of the rejected value.
        found: ValueKind,
    },

    /// Binary encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl PayloadError {
    /// Creates a property type error.
    #[must_use]
    pub fn property_type(name: impl Into<String>, found: ValueKind) -> Self {
        Self::PropertyType {
            name: name.into(),
            found,
        }
    }
}

/// Errors raised by the msgpack codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Serialising a payload to msgpack failed.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Deserialising msgpack bytes failed.
    #[error("failed to decode payload: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
