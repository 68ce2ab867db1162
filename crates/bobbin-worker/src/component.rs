//! Collaborator hooks plugged into the component server.
//!
//! A worker is assembled from three pieces: a [`ComponentKind`] that builds an
//! instance from each request and converts the outcome back into a payload, a
//! [`Callback`] holding the business logic, and a [`MetaClassifier`] that
//! picks the one-byte reply meta.

use bobbin_payload::{CommandPayload, PayloadTree};

use crate::error::{CallbackError, ComponentError};

/// One-byte classification sent as the first reply frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseMeta {
    /// Nothing further for the requester to do.
    #[default]
    Empty = 0x00,
    /// The reply asks for further service calls.
    ServiceCall = 0x01,
    /// The reply carries files.
    Files = 0x02,
    /// The reply carries transactions.
    Transactions = 0x03,
    /// The reply is a download.
    Download = 0x04,
}

impl ResponseMeta {
    /// Wire byte for this classification.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parses a wire byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Empty),
            0x01 => Some(Self::ServiceCall),
            0x02 => Some(Self::Files),
            0x03 => Some(Self::Transactions),
            0x04 => Some(Self::Download),
            _ => None,
        }
    }
}

/// What the result converter receives after dispatch.
#[derive(Debug)]
pub enum Outcome<I> {
    /// The callback completed; the instance holds its effects.
    Component(I),
    /// Dispatch failed and the error hook produced this payload.
    Payload(PayloadTree),
}

/// Factory and converters for one kind of component.
pub trait ComponentKind {
    /// Per-request instance handed to the callback.
    type Instance;

    /// Builds an instance from the decoded request.
    ///
    /// # Errors
    ///
    /// Returns a [`ComponentError`] when the request cannot be represented,
    /// for example because a parameter violates its declared type.
    fn create_component_instance(
        &self,
        command: &CommandPayload,
    ) -> Result<Self::Instance, ComponentError>;

    /// Converts a dispatch failure into a payload.
    ///
    /// `instance` is the last known instance, absent when the factory itself
    /// failed.
    fn create_error_payload(
        &self,
        error: &CallbackError,
        instance: Option<&Self::Instance>,
        command: &CommandPayload,
    ) -> PayloadTree;

    /// Converts the dispatch outcome into the reply's result payload.
    ///
    /// Called exactly once per dispatched request.
    fn component_to_payload(&self, name: &str, outcome: Outcome<Self::Instance>) -> PayloadTree;
}

/// Business logic run against each component instance.
pub trait Callback<I> {
    /// Runs the callback, mutating the instance in place.
    ///
    /// # Errors
    ///
    /// Any error is caught by the server and handed to the error hook.
    fn call(&self, instance: &mut I) -> Result<(), CallbackError>;
}

impl<I, F> Callback<I> for F
where
    F: Fn(&mut I) -> Result<(), CallbackError>,
{
    fn call(&self, instance: &mut I) -> Result<(), CallbackError> {
        self(instance)
    }
}

/// Chooses the reply meta byte from the request.
pub trait MetaClassifier {
    /// Classifies the request.
    fn classify(&self, command: &CommandPayload) -> ResponseMeta;
}

impl<F> MetaClassifier for F
where
    F: Fn(&CommandPayload) -> ResponseMeta,
{
    fn classify(&self, command: &CommandPayload) -> ResponseMeta {
        self(command)
    }
}

/// Classifier that always answers [`ResponseMeta::Empty`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyMeta;

impl MetaClassifier for EmptyMeta {
    fn classify(&self, _command: &CommandPayload) -> ResponseMeta {
        ResponseMeta::Empty
    }
}
