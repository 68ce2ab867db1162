//! Shared per-request transport: call metadata and accumulated results.
//!
//! The transport is a [`PayloadTree`] with four fixed regions:
//!
//! - `meta`: the origin chain (`[service, version, action]` triples already
//!   visited), the gateway address pair, string-only custom properties, and
//!   the informational request `id` and `datetime`.
//! - `data`: results keyed by `service / version / action`.
//! - `files` and `transactions`: reserved, always present as empty mappings
//!   unless the inbound transport carried content for them.

use serde_json::{Map, Value};

use crate::error::PayloadError;
use crate::kind::ValueKind;
use crate::names::FieldNames;
use crate::tree::PayloadTree;

const REGIONS: [&str; 4] = ["meta", "data", "files", "transactions"];

/// One hop recorded in the origin chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginEntry {
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Action name.
    pub action: String,
}

impl OriginEntry {
    fn from_value(value: &Value) -> Option<Self> {
        let [service, version, action] = value.as_array()?.as_slice() else {
            return None;
        };
        Some(Self {
            service: service.as_str()?.to_owned(),
            version: version.as_str()?.to_owned(),
            action: action.as_str()?.to_owned(),
        })
    }

    fn matches(&self, service: &str, version: &str, action: &str) -> bool {
        self.service == service && self.version == version && self.action == action
    }
}

/// Gateway addresses that admitted the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateway {
    /// Address reachable from inside the cluster.
    pub internal: String,
    /// Address exposed to clients.
    pub public: String,
}

/// Cross-call metadata and result data for one request lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    tree: PayloadTree,
}

impl Transport {
    /// Creates an empty transport with all regions present.
    #[must_use]
    pub fn new(names: FieldNames) -> Self {
        let mut tree = PayloadTree::new(names);
        for region in REGIONS {
            tree.set_in(&[region], Value::Object(Map::new()));
        }
        Self { tree }
    }

    /// Loads a transport received from upstream.
    ///
    /// Missing regions are added as empty mappings.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::NotAMapping`] when the value, or one of its
    /// regions, is not a mapping.
    pub fn from_value(value: Value, names: FieldNames) -> Result<Self, PayloadError> {
        let mut tree = PayloadTree::from_value(value, names)?;
        for region in REGIONS {
            match tree.get_in(&[region]) {
                None => tree.set_in(&[region], Value::Object(Map::new())),
                Some(Value::Object(_)) => {}
                Some(other) => {
                    return Err(PayloadError::NotAMapping {
                        found: ValueKind::of(other),
                    });
                }
            }
        }
        Ok(Self { tree })
    }

    /// Naming mode of the underlying tree.
    #[must_use]
    pub const fn names(&self) -> FieldNames {
        self.tree.names()
    }

    /// Borrows the underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &PayloadTree {
        &self.tree
    }

    /// Consumes the transport into a plain value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.tree.into_value()
    }

    /// Appends a hop to the origin chain.
    pub fn record_origin(&mut self, service: &str, version: &str, action: &str) {
        self.tree.push_in(
            &["meta", "origin"],
            Value::Array(vec![
                Value::from(service),
                Value::from(version),
                Value::from(action),
            ]),
        );
    }

    /// Recorded origin chain, skipping malformed entries.
    #[must_use]
    pub fn origin_chain(&self) -> Vec<OriginEntry> {
        self.tree
            .get_in(&["meta", "origin"])
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(OriginEntry::from_value).collect())
            .unwrap_or_default()
    }

    /// Whether the triple already appears in the origin chain.
    #[must_use]
    pub fn is_in_origin_chain(&self, service: &str, version: &str, action: &str) -> bool {
        self.origin_chain()
            .iter()
            .any(|entry| entry.matches(service, version, action))
    }

    /// Sets a custom property.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::PropertyType`] unless `value` is a string.
    pub fn set_property(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), PayloadError> {
        let value = value.into();
        if !value.is_string() {
            return Err(PayloadError::property_type(name, ValueKind::of(&value)));
        }
        self.tree.set_in(&["meta", "properties", name], value);
        Ok(())
    }

    /// Reads a custom property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.tree
            .get_in(&["meta", "properties", name])
            .and_then(Value::as_str)
    }

    /// Records the gateway address pair.
    pub fn set_gateway(&mut self, internal: &str, public: &str) {
        self.tree.set_in(
            &["meta", "gateway"],
            Value::Array(vec![Value::from(internal), Value::from(public)]),
        );
    }

    /// Gateway address pair, when present and well formed.
    #[must_use]
    pub fn gateway(&self) -> Option<Gateway> {
        let pair = self.tree.get_in(&["meta", "gateway"])?.as_array()?;
        let [internal, public] = pair.as_slice() else {
            return None;
        };
        Some(Gateway {
            internal: internal.as_str()?.to_owned(),
            public: public.as_str()?.to_owned(),
        })
    }

    /// Request identifier assigned by the gateway.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.tree.get_in(&["meta", "id"]).and_then(Value::as_str)
    }

    /// Request timestamp assigned by the gateway.
    #[must_use]
    pub fn datetime(&self) -> Option<&str> {
        self.tree.get_in(&["meta", "datetime"]).and_then(Value::as_str)
    }

    /// Replaces the result stored for an action.
    pub fn write_result(&mut self, service: &str, version: &str, action: &str, value: Value) {
        self.tree.set_in(&["data", service, version, action], value);
    }

    /// Result stored for an action.
    #[must_use]
    pub fn result(&self, service: &str, version: &str, action: &str) -> Option<&Value> {
        self.tree.get_in(&["data", service, version, action])
    }
}
