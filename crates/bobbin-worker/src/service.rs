//! The service component kind and a by-name action router.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bobbin_config::Config;
use bobbin_payload::{CommandPayload, ErrorPayload, FieldNames, PayloadTree, Transport};

use crate::action::Action;
use crate::component::{Callback, ComponentKind, Outcome};
use crate::error::{CallbackError, ComponentError};

/// Component kind that turns every request into an [`Action`].
#[derive(Debug, Clone)]
pub struct ServiceComponent {
    service: String,
    version: String,
    variables: Arc<BTreeMap<String, String>>,
    debug: bool,
    names: FieldNames,
}

impl ServiceComponent {
    /// Creates a service kind with no variables and debugging off.
    #[must_use]
    pub fn new(service: &str, version: &str, names: FieldNames) -> Self {
        Self {
            service: service.to_owned(),
            version: version.to_owned(),
            variables: Arc::default(),
            debug: false,
            names,
        }
    }

    /// Creates a service kind from the worker configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            service: config.component().to_owned(),
            version: config.version().to_owned(),
            variables: Arc::new(config.variables()),
            debug: config.debug(),
            names: FieldNames::from_compact_flag(config.compact_names()),
        }
    }

    /// Naming mode used for the payloads this kind produces.
    #[must_use]
    pub const fn names(&self) -> FieldNames {
        self.names
    }
}

impl ComponentKind for ServiceComponent {
    type Instance = Action;

    fn create_component_instance(
        &self,
        command: &CommandPayload,
    ) -> Result<Action, ComponentError> {
        let transport = command
            .transport()?
            .unwrap_or_else(|| Transport::new(self.names));
        let action = Action::new(&self.service, &self.version, command.name(), transport)
            .with_params(command.params())?
            .with_variables(Arc::clone(&self.variables))
            .with_debug(self.debug);
        Ok(action)
    }

    fn create_error_payload(
        &self,
        error: &CallbackError,
        _instance: Option<&Action>,
        _command: &CommandPayload,
    ) -> PayloadTree {
        ErrorPayload::new(&error.to_string(), self.names).into_tree()
    }

    fn component_to_payload(&self, _name: &str, outcome: Outcome<Action>) -> PayloadTree {
        match outcome {
            Outcome::Component(action) => {
                let mut payload = PayloadTree::new(self.names);
                payload.set("transport", action.into_transport().into_value());
                payload
            }
            Outcome::Payload(payload) => payload,
        }
    }
}

/// Handler registered on an [`ActionRouter`].
pub type ActionHandler = Box<dyn Fn(&mut Action) -> Result<(), CallbackError> + Send + Sync>;

/// Callback that dispatches to a handler chosen by action name.
#[derive(Default)]
pub struct ActionRouter {
    handlers: BTreeMap<String, ActionHandler>,
}

impl ActionRouter {
    /// Creates a router with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for an action, replacing any earlier one.
    #[must_use]
    pub fn route<F>(mut self, action: &str, handler: F) -> Self
    where
        F: Fn(&mut Action) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.handlers.insert(action.to_owned(), Box::new(handler));
        self
    }

    /// Names of the routed actions, in order.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl fmt::Debug for ActionRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRouter")
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Callback<Action> for ActionRouter {
    fn call(&self, instance: &mut Action) -> Result<(), CallbackError> {
        let handler = self
            .handlers
            .get(instance.name())
            .ok_or_else(|| CallbackError::unknown_action(instance.name()))?;
        handler(instance)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use bobbin_payload::{ReplyPayload, Value};

    use super::*;

    #[fixture]
    fn kind() -> ServiceComponent {
        ServiceComponent::new("users", "1.0", FieldNames::Verbose)
    }

    #[rstest]
    fn builds_actions_from_commands(kind: ServiceComponent) {
        let command =
            CommandPayload::new("read", FieldNames::Verbose).with_param("id", json!(3), None);
        let action = kind.create_component_instance(&command).expect("instance");

        assert_eq!(action.service(), "users");
        assert_eq!(action.version(), "1.0");
        assert_eq!(action.name(), "read");
        assert_eq!(action.get_param("id").value(), &json!(3));
        assert!(action.is_origin());
    }

    #[rstest]
    fn inbound_transport_is_reused(kind: ServiceComponent) {
        let mut transport = Transport::new(FieldNames::Verbose);
        transport.record_origin("users", "1.0", "read");
        let command = CommandPayload::new("read", FieldNames::Verbose).with_transport(&transport);

        let action = kind.create_component_instance(&command).expect("instance");
        assert!(!action.is_origin());
    }

    #[rstest]
    fn mistyped_params_fail_the_factory(kind: ServiceComponent) {
        let command = CommandPayload::new("read", FieldNames::Verbose)
            .with_param("id", json!(3), Some("string"));
        assert!(matches!(
            kind.create_component_instance(&command),
            Err(ComponentError::ParamType { .. })
        ));
    }

    #[rstest]
    fn successful_actions_return_their_transport(kind: ServiceComponent) {
        let command = CommandPayload::new("read", FieldNames::Verbose);
        let mut action = kind.create_component_instance(&command).expect("instance");
        action.set_entity(json!({"id": 1})).expect("entity");

        let payload = kind.component_to_payload("read", Outcome::Component(action));
        assert_eq!(
            payload.get("transport/data/users/1.0/read"),
            Some(&json!({"id": 1}))
        );
    }

    #[rstest]
    fn errors_become_error_payloads(kind: ServiceComponent) {
        let command = CommandPayload::new("read", FieldNames::Verbose);
        let error = CallbackError::failed("database offline");
        let payload = kind.create_error_payload(&error, None, &command);
        let converted = kind.component_to_payload("read", Outcome::Payload(payload.clone()));

        assert_eq!(converted, payload);
        let bytes = bobbin_payload::codec::encode(&converted).expect("encode");
        let ReplyPayload::Error(decoded) =
            ReplyPayload::decode(&bytes, FieldNames::Verbose).expect("decode")
        else {
            panic!("expected an error payload");
        };
        assert_eq!(decoded.message(), "database offline");
    }

    #[test]
    fn router_dispatches_by_name() {
        let router = ActionRouter::new()
            .route("read", |action: &mut Action| {
                action.set_entity(json!({"handled": "read"}))?;
                Ok(())
            })
            .route("list", |action: &mut Action| {
                action.set_collection(Value::Array(Vec::new()))?;
                Ok(())
            });
        assert_eq!(router.actions().collect::<Vec<_>>(), vec!["list", "read"]);

        let mut action = Action::new("users", "1.0", "read", Transport::new(FieldNames::Verbose));
        router.call(&mut action).expect("routed");
        assert_eq!(
            action.transport().result("users", "1.0", "read"),
            Some(&json!({"handled": "read"}))
        );

        let mut unknown = Action::new("users", "1.0", "drop", Transport::new(FieldNames::Verbose));
        assert!(matches!(
            router.call(&mut unknown),
            Err(CallbackError::UnknownAction { ref action }) if action == "drop"
        ));
    }
}
