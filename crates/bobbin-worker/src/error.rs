//! Errors raised by the component facade and during dispatch.

use std::any::Any;

use thiserror::Error;

use bobbin_payload::{PayloadError, ValueKind};

/// Type-contract violations raised by the component facade.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A parameter declared one type but carried a value of another.
    #[error("parameter '{name}' is declared as {declared} but its value is {inferred}")]
    ParamType {
        /// Parameter name.
        name: String,
        /// Declared type.
        declared: ValueKind,
        /// Type inferred from the value.
        inferred: ValueKind,
    },

    /// A parameter declared a type name that is not recognised.
    #[error("parameter '{name}' has unknown type '{declared}'")]
    UnknownParamType {
        /// Parameter name.
        name: String,
        /// The unrecognised type name.
        declared: String,
    },

    /// A result setter received a value of the wrong shape.
    #[error("{operation} expects {expected} but got {found}")]
    ResultShape {
        /// Facade method that rejected the value.
        operation: &'static str,
        /// Kind the method accepts.
        expected: ValueKind,
        /// Kind that was supplied.
        found: ValueKind,
    },

    /// A payload or transport operation failed.
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl ComponentError {
    /// Builds a [`ComponentError::ResultShape`] error.
    #[must_use]
    pub const fn result_shape(
        operation: &'static str,
        expected: ValueKind,
        found: ValueKind,
    ) -> Self {
        Self::ResultShape {
            operation,
            expected,
            found,
        }
    }
}

/// Failures caught at the dispatch boundary and handed to the error hook.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The callback reported a failure.
    #[error("{message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },

    /// The callback panicked.
    #[error("callback panicked: {message}")]
    Panicked {
        /// Panic message, when it could be recovered.
        message: String,
    },

    /// No handler is registered for the requested action.
    #[error("unknown action '{action}'")]
    UnknownAction {
        /// Requested action name.
        action: String,
    },

    /// The component instance could not be built from the request.
    #[error("failed to build component instance: {source}")]
    Factory {
        /// Underlying type-contract or payload error.
        #[source]
        source: ComponentError,
    },

    /// A facade call inside the callback violated a type contract.
    #[error(transparent)]
    Component(#[from] ComponentError),
}

impl CallbackError {
    /// Builds a [`CallbackError::Failed`] error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Builds a [`CallbackError::UnknownAction`] error.
    pub fn unknown_action(action: impl Into<String>) -> Self {
        Self::UnknownAction {
            action: action.into(),
        }
    }

    /// Wraps a factory failure.
    #[must_use]
    pub const fn factory(source: ComponentError) -> Self {
        Self::Factory { source }
    }

    /// Converts a caught panic payload into an error.
    #[must_use]
    pub fn panicked(payload: &(dyn Any + Send)) -> Self {
        Self::Panicked {
            message: panic_message(payload),
        }
    }
}

/// Recovers the message of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
