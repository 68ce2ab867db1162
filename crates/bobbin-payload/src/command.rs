//! Inbound command payloads.
//!
//! A command names the action to run (`command/name`), lists its parameters
//! (`command/params`), carries request metadata under `meta`, and may carry
//! the upstream transport under `command/transport`.

use serde_json::Value;

use crate::codec;
use crate::error::{CodecError, PayloadError};
use crate::names::FieldNames;
use crate::transport::Transport;
use crate::tree::PayloadTree;

/// One entry of `command/params`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRecord {
    /// Parameter name.
    pub name: String,
    /// Parameter value; a record without one carries null.
    pub value: Value,
    /// Declared type name, when the caller supplied one.
    pub declared_type: Option<String>,
}

impl ParamRecord {
    /// Reads a record, returning `None` when it has no string name.
    #[must_use]
    pub fn from_value(record: &Value, names: FieldNames) -> Option<Self> {
        let fields = record.as_object()?;
        let name = fields.get(names.key("name"))?.as_str()?.to_owned();
        let value = fields.get(names.key("value")).cloned().unwrap_or(Value::Null);
        let declared_type = fields
            .get(names.key("type"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        Some(Self {
            name,
            value,
            declared_type,
        })
    }

    /// Writes the record as a mapping using the given naming mode.
    #[must_use]
    pub fn to_value(&self, names: FieldNames) -> Value {
        let mut fields = vec![
            ("name", Value::from(self.name.as_str())),
            ("value", self.value.clone()),
        ];
        if let Some(declared) = &self.declared_type {
            fields.push(("type", Value::from(declared.as_str())));
        }
        names.object(fields)
    }
}

/// Request payload naming an action and its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPayload {
    tree: PayloadTree,
}

impl CommandPayload {
    /// Creates a command with no parameters.
    #[must_use]
    pub fn new(name: &str, names: FieldNames) -> Self {
        let mut tree = PayloadTree::new(names);
        tree.set("command/name", Value::from(name));
        Self { tree }
    }

    /// Appends a parameter record.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: Value, declared_type: Option<&str>) -> Self {
        let record = ParamRecord {
            name: name.to_owned(),
            value,
            declared_type: declared_type.map(str::to_owned),
        };
        let encoded = record.to_value(self.tree.names());
        self.tree.push("command/params", encoded);
        self
    }

    /// Attaches an upstream transport.
    #[must_use]
    pub fn with_transport(mut self, transport: &Transport) -> Self {
        self.tree.set("command/transport", transport.tree().to_value());
        self
    }

    /// Sets a request metadata field.
    #[must_use]
    pub fn with_meta(mut self, field: &str, value: Value) -> Self {
        self.tree.set_in(&["meta", field], value);
        self
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

    /// Action name requested by the caller.
    #[must_use]
    pub fn name(&self) -> &str {
        self.tree.get_str("command/name").unwrap_or_default()
    }

    /// Parameter records in request order, skipping malformed entries.
    #[must_use]
    pub fn params(&self) -> Vec<ParamRecord> {
        let names = self.tree.names();
        self.tree
            .get_array("command/params")
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| ParamRecord::from_value(record, names))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Request metadata field.
    #[must_use]
    pub fn meta(&self, field: &str) -> Option<&Value> {
        self.tree.get_in(&["meta", field])
    }

    /// Request scope, when the caller supplied one.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.meta("scope").and_then(Value::as_str)
    }

    /// Upstream transport, when one was attached.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::NotAMapping`] when the attached transport is
    /// malformed.
    pub fn transport(&self) -> Result<Option<Transport>, PayloadError> {
        self.tree
            .get("command/transport")
            .map(|value| Transport::from_value(value.clone(), self.tree.names()))
            .transpose()
    }

    /// Borrows the underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &PayloadTree {
        &self.tree
    }

    /// Encodes the command as msgpack.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(&self.tree)
    }
}

/// Reusable decoder for inbound command bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandDecoder {
    names: FieldNames,
}

impl CommandDecoder {
    /// Creates a decoder reading with the given naming mode.
    #[must_use]
    pub const fn new(names: FieldNames) -> Self {
        Self { names }
    }

    /// Naming mode used by this decoder.
    #[must_use]
    pub const fn names(&self) -> FieldNames {
        self.names
    }

    /// Decodes a msgpack command body.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] when the bytes are not msgpack, the root is
    /// not a mapping, or the command has no name.
    pub fn decode(&self, bytes: &[u8]) -> Result<CommandPayload, PayloadError> {
        let tree = codec::decode(bytes, self.names)?;
        CommandPayload::from_tree(tree)
    }
}
