//! Worker runtime for Bobbin components.
//!
//! A worker is a long-running process that serves one component. It loads its
//! configuration through [`bobbin_config`], installs structured telemetry,
//! connects a ZeroMQ `REP` socket to the component's well-known endpoint, and
//! then answers requests one at a time:
//!
//! - each request is three frames (`action`, `mappings`, `stream`) whose
//!   `stream` frame is a msgpack [`CommandPayload`](bobbin_payload::CommandPayload);
//! - each reply is two frames: a single meta byte (see [`ResponseMeta`]) and a
//!   msgpack body holding a command result or an error.
//!
//! The [`ComponentServer`] is generic over a [`ComponentKind`], which builds a
//! per-request instance, reports failures, and converts the finished instance
//! back into a payload. [`ServiceComponent`] is the kind used by services: it
//! hands callbacks an [`Action`] with typed [`Param`] access and records
//! results in the request transport. [`ActionRouter`] dispatches on the action
//! name.
//!
//! Callback failures never stop the loop. Errors and panics raised while a
//! request is handled become error payloads in the reply; only socket failures
//! end [`ComponentServer::run`].

mod action;
mod bootstrap;
mod component;
mod error;
mod health;
mod param;
mod process;
mod server;
mod service;
pub mod socket;
mod telemetry;

pub use action::Action;
pub use bootstrap::{
    BootstrapError, ConfigLoader, StaticConfigLoader, SystemConfigLoader, Worker, bootstrap_with,
};
pub use component::{Callback, ComponentKind, EmptyMeta, MetaClassifier, Outcome, ResponseMeta};
pub use error::{CallbackError, ComponentError};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use param::Param;
pub use process::{LaunchError, run_service, run_service_with};
pub use server::{ComponentServer, Reply, RequestError, ServerError};
pub use service::{ActionHandler, ActionRouter, ServiceComponent};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
