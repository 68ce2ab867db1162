//! Shared configuration for Bobbin component workers.
//!
//! A worker reads its configuration exactly once at startup. Values are
//! layered by [`ortho_config`]: built-in defaults, then a `bobbin.toml` file
//! (see `--config-path` / `BOBBIN_CONFIG_PATH`), then `BOBBIN_*` environment
//! variables, then command-line flags. The resolved [`Config`] is immutable
//! for the lifetime of the worker: the field-name mode, declared variables and
//! socket endpoint never change while requests are being served.

mod defaults;
mod logging;
mod socket;
mod variables;

use std::collections::BTreeMap;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEBUG_LOG_FILTER, DEFAULT_FRAMEWORK_VERSION, DEFAULT_LOG_FILTER, DEFAULT_TCP_PORT,
    default_framework_version, default_log_filter, default_log_filter_string,
    default_log_format, default_socket_endpoint,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError};
pub use variables::{VariableDirective, VariableDirectiveParseError, variable_table};

/// Resolved worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "BOBBIN")]
#[serde(default)]
pub struct Config {
    /// Name of the component this worker serves.
    pub component: String,
    /// Version of the component this worker serves.
    #[ortho_config(cli_long = "component-version")]
    pub version: String,
    /// Version of the framework the component was built against.
    #[ortho_config(default = default_framework_version())]
    pub framework_version: String,
    /// Variables declared for the component (`name=value`).
    #[ortho_config(merge_strategy = "append")]
    pub variables: Vec<VariableDirective>,
    /// Enables verbose component logging.
    pub debug: bool,
    /// Uses verbose payload field names instead of the compact aliases.
    pub disable_compact_names: bool,
    /// Explicit socket endpoint; derived from component and version when absent.
    pub socket: Option<SocketEndpoint>,
    /// Stops the worker when no request arrives within this many milliseconds.
    pub idle_timeout_ms: Option<u64>,
    /// Tracing filter expression for worker logs.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for worker logs.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            component: String::new(),
            version: String::new(),
            framework_version: default_framework_version(),
            variables: Vec::new(),
            debug: false,
            disable_compact_names: false,
            socket: None,
            idle_timeout_ms: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Checks the invariants a worker relies on before it connects.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the component name or version is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.component.trim().is_empty() {
            return Err(ConfigError::MissingComponent);
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::MissingVersion {
                component: self.component.clone(),
            });
        }
        Ok(())
    }

    /// Component name.
    #[must_use]
    pub fn component(&self) -> &str {
        self.component.trim()
    }

    /// Component version.
    #[must_use]
    pub fn version(&self) -> &str {
        self.version.trim()
    }

    /// Framework version.
    #[must_use]
    pub fn framework_version(&self) -> &str {
        &self.framework_version
    }

    /// Whether payloads use compact field names.
    #[must_use]
    pub fn compact_names(&self) -> bool {
        !self.disable_compact_names
    }

    /// Whether debug logging is enabled.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Declared variables keyed by name.
    #[must_use]
    pub fn variables(&self) -> BTreeMap<String, String> {
        variable_table(&self.variables)
    }

    /// Endpoint the worker connects to.
    #[must_use]
    pub fn socket_endpoint(&self) -> SocketEndpoint {
        self.socket
            .clone()
            .unwrap_or_else(|| default_socket_endpoint(self.component(), self.version()))
    }

    /// Longest wait for a request before the worker gives up; unbounded when unset.
    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }

    /// Tracing filter; debug mode raises the level to at least `debug`.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        if self.debug && self.log_filter == DEFAULT_LOG_FILTER {
            DEBUG_LOG_FILTER
        } else {
            &self.log_filter
        }
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Errors raised when a loaded configuration cannot run a worker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No component name was configured.
    #[error("component name is required")]
    MissingComponent,
    /// No component version was configured.
    #[error("component '{component}' has no version")]
    MissingVersion {
        /// Component missing the version.
        component: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(component: &str, version: &str) -> Config {
        Config {
            component: component.to_owned(),
            version: version.to_owned(),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_prefer_compact_names() {
        let config = Config::default();
        assert!(config.compact_names());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.framework_version(), DEFAULT_FRAMEWORK_VERSION);
        assert_eq!(config.idle_timeout(), None);
    }

    #[test]
    fn validate_requires_component_and_version() {
        assert_eq!(Config::default().validate(), Err(ConfigError::MissingComponent));
        assert_eq!(
            named("users", " ").validate(),
            Err(ConfigError::MissingVersion {
                component: "users".to_owned()
            })
        );
        assert_eq!(named("users", "1.0").validate(), Ok(()));
    }

    #[test]
    fn debug_raises_default_filter_only() {
        let mut config = named("users", "1.0");
        config.debug = true;
        assert_eq!(config.log_filter(), DEBUG_LOG_FILTER);

        config.log_filter = "warn,bobbin_worker=trace".to_owned();
        assert_eq!(config.log_filter(), "warn,bobbin_worker=trace");
    }

    #[test]
    fn explicit_socket_overrides_derived_endpoint() {
        let mut config = named("users", "1.0");
        config.socket = Some(SocketEndpoint::tcp("127.0.0.1", 7000));
        assert_eq!(config.socket_endpoint(), SocketEndpoint::tcp("127.0.0.1", 7000));
    }

    #[test]
    fn idle_timeout_is_read_as_milliseconds() {
        let mut config = named("users", "1.0");
        config.idle_timeout_ms = Some(250);
        assert_eq!(config.idle_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn variables_are_collapsed_by_name() {
        let mut config = named("users", "1.0");
        config.variables = vec![
            VariableDirective::new("region", "eu"),
            VariableDirective::new("pool", "4"),
        ];
        let variables = config.variables();
        assert_eq!(variables.get("region").map(String::as_str), Some("eu"));
        assert_eq!(variables.get("pool").map(String::as_str), Some("4"));
    }
}
