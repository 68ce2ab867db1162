//! Typed action parameters.

use std::str::FromStr;

use bobbin_payload::{ParamRecord, Value, ValueKind};

use crate::error::ComponentError;

/// A named, typed parameter value.
///
/// Parameters are immutable once built. A parameter requested by a name the
/// caller never sent is still returned, with [`Param::exists`] set to `false`,
/// an empty string value, and an empty type name.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    value: Value,
    kind: Option<ValueKind>,
}

impl Param {
    /// Builds a parameter, inferring its type or checking a declared one.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownParamType`] when `declared` names no
    /// known type, and [`ComponentError::ParamType`] when it disagrees with
    /// the value.
    pub fn new(name: &str, value: Value, declared: Option<&str>) -> Result<Self, ComponentError> {
        let inferred = ValueKind::of(&value);
        if let Some(type_name) = declared {
            let declared_kind =
                ValueKind::from_str(type_name).map_err(|_| ComponentError::UnknownParamType {
                    name: name.to_owned(),
                    declared: type_name.to_owned(),
                })?;
            if declared_kind != inferred {
                return Err(ComponentError::ParamType {
                    name: name.to_owned(),
                    declared: declared_kind,
                    inferred,
                });
            }
        }
        Ok(Self {
            name: name.to_owned(),
            value,
            kind: Some(inferred),
        })
    }

    /// Builds a parameter from a request record.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`Param::new`].
    pub fn from_record(record: ParamRecord) -> Result<Self, ComponentError> {
        Self::new(&record.name, record.value, record.declared_type.as_deref())
    }

    pub(crate) fn absent(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: Value::String(String::new()),
            kind: None,
        }
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Parameter type, `None` for an absent parameter.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        self.kind
    }

    /// Parameter type name as written on the wire; empty when absent.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.map_or("", ValueKind::as_str)
    }

    /// Whether the caller supplied this parameter.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.kind.is_some()
    }

    /// Consumes the parameter, returning its value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }
}
