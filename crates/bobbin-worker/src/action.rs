//! The action facade handed to service callbacks.
//!
//! An [`Action`] is built once per request by the service component kind. It
//! owns the request's [`Transport`] until the reply is encoded, so every
//! result a callback records lands in the transport that travels back.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use bobbin_payload::{ParamRecord, Transport, Value, ValueKind};

use crate::error::ComponentError;
use crate::param::Param;

const ACTION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::action");

/// One inbound call to a service action.
#[derive(Debug, Clone)]
pub struct Action {
    service: String,
    version: String,
    name: String,
    params: Vec<Param>,
    transport: Transport,
    variables: Arc<BTreeMap<String, String>>,
    debug: bool,
}

impl Action {
    /// Creates an action with no parameters or variables.
    #[must_use]
    pub fn new(service: &str, version: &str, name: &str, transport: Transport) -> Self {
        Self {
            service: service.to_owned(),
            version: version.to_owned(),
            name: name.to_owned(),
            params: Vec::new(),
            transport,
            variables: Arc::default(),
            debug: false,
        }
    }

    /// Adds parameters read from the request.
    ///
    /// A record repeating an earlier name replaces it in place.
    ///
    /// # Errors
    ///
    /// Returns the first type-contract violation among the records.
    pub fn with_params<I>(mut self, records: I) -> Result<Self, ComponentError>
    where
        I: IntoIterator<Item = ParamRecord>,
    {
        for record in records {
            let param = Param::from_record(record)?;
            match self.params.iter_mut().find(|known| known.name() == param.name()) {
                Some(slot) => *slot = param,
                None => self.params.push(param),
            }
        }
        Ok(self)
    }

    /// Shares the worker's declared variables with the action.
    #[must_use]
    pub fn with_variables(mut self, variables: Arc<BTreeMap<String, String>>) -> Self {
        self.variables = variables;
        self
    }

    /// Enables debug logging through [`Action::log`].
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Action name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when the request carried the named parameter.
    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|param| param.name() == name)
    }

    /// Returns the named parameter, or an absent one when it was not sent.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Param {
        self.params
            .iter()
            .find(|param| param.name() == name)
            .cloned()
            .unwrap_or_else(|| Param::absent(name))
    }

    /// All parameters in request order.
    #[must_use]
    pub fn get_params(&self) -> &[Param] {
        &self.params
    }

    /// Builds a parameter for use in outgoing calls.
    ///
    /// # Errors
    ///
    /// Fails when `declared` is unknown or disagrees with the value.
    #[expect(clippy::unused_self, reason = "parameters are built through the action facade")]
    pub fn new_param(
        &self,
        name: &str,
        value: Value,
        declared: Option<&str>,
    ) -> Result<Param, ComponentError> {
        Param::new(name, value, declared)
    }

    /// Sets a string property on the transport.
    ///
    /// # Errors
    ///
    /// Returns a [`ComponentError::Payload`] wrapping the transport's
    /// property type error when `value` is not a string.
    pub fn set_property(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), ComponentError> {
        Ok(self.transport.set_property(name, value)?)
    }

    /// Records a single entity as this action's result.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::ResultShape`] unless `entity` is a mapping.
    pub fn set_entity(&mut self, entity: Value) -> Result<(), ComponentError> {
        self.write_result("set_entity", ValueKind::Object, entity)
    }

    /// Records a collection of entities as this action's result.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::ResultShape`] unless `collection` is a
    /// sequence.
    pub fn set_collection(&mut self, collection: Value) -> Result<(), ComponentError> {
        self.write_result("set_collection", ValueKind::Array, collection)
    }

    /// Returns `true` when this action's triple is absent from the origin
    /// chain.
    #[must_use]
    pub fn is_origin(&self) -> bool {
        !self
            .transport
            .is_in_origin_chain(&self.service, &self.version, &self.name)
    }

    /// Reads a variable declared for the worker.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Emits a debug log line tagged with the action, when debugging is on.
    pub fn log(&self, message: &str) {
        if !self.debug {
            return;
        }
        debug!(
            target: ACTION_TARGET,
            service = %self.service,
            version = %self.version,
            action = %self.name,
            "{message}"
        );
    }

    /// Borrows the request transport.
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Releases the request transport.
    #[must_use]
    pub fn into_transport(self) -> Transport {
        self.transport
    }

    fn write_result(
        &mut self,
        operation: &'static str,
        expected: ValueKind,
        value: Value,
    ) -> Result<(), ComponentError> {
        let found = ValueKind::of(&value);
        if found != expected {
            return Err(ComponentError::result_shape(operation, expected, found));
        }
        self.transport.write_result(&self.service, &self.version, &self.name, value);
        Ok(())
    }
}
