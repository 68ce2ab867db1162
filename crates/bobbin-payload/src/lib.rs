//! Payload data model for Bobbin component workers.
//!
//! Every message a worker exchanges is a [`PayloadTree`]: a string-keyed
//! mapping addressed by `/`-separated paths and encoded as msgpack. On top of
//! the tree this crate provides the typed views used by the protocol:
//!
//! - [`CommandPayload`] for inbound requests, decoded by a reusable
//!   [`CommandDecoder`];
//! - [`CommandResultPayload`] and [`ErrorPayload`] for reply bodies, with
//!   [`ReplyPayload`] telling them apart on the requester side;
//! - [`Transport`] for the per-request metadata and result data shared across
//!   calls.
//!
//! All views honour the worker's [`FieldNames`] mode, which swaps protocol
//! field names for single-letter aliases on the wire.

pub mod codec;
mod command;
mod error;
mod kind;
mod names;
mod reply;
mod transport;
mod tree;

pub use command::{CommandDecoder, CommandPayload, ParamRecord};
pub use error::{CodecError, PayloadError};
pub use kind::ValueKind;
pub use names::{FieldNames, compact_alias};
pub use reply::{
    CommandResultPayload, DEFAULT_ERROR_MESSAGE, DEFAULT_ERROR_STATUS, ErrorPayload,
    INTERNAL_COMMUNICATION_FAILED, ReplyPayload,
};
pub use serde_json::{Map, Value};
pub use transport::{Gateway, OriginEntry, Transport};
pub use tree::{PATH_SEPARATOR, PayloadTree, split_path};
