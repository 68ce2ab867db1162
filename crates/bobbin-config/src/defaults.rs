use camino::Utf8PathBuf;
use std::env;

#[cfg(unix)]
use libc::geteuid;

#[cfg(unix)]
use dirs::runtime_dir;

use crate::socket::SocketEndpoint;

/// Base TCP port used when Unix domain sockets are not available.
pub const DEFAULT_TCP_PORT: u16 = 5010;

/// Default log filter expression used by workers.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log filter applied when the worker runs in debug mode.
pub const DEBUG_LOG_FILTER: &str = "debug";

/// Framework version assumed when none is configured.
pub const DEFAULT_FRAMEWORK_VERSION: &str = "1.0.0";

/// Default log filter expression used by workers.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Owned framework version used by serde defaults.
pub fn default_framework_version() -> String {
    DEFAULT_FRAMEWORK_VERSION.to_string()
}

/// Default logging format for workers.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Computes the well-known socket endpoint for a component.
///
/// Each `(component, version)` pair maps to its own socket so several
/// workers can share a host without colliding.
pub fn default_socket_endpoint(component: &str, version: &str) -> SocketEndpoint {
    default_socket_endpoint_inner(&socket_stem(component, version))
}

fn socket_stem(component: &str, version: &str) -> String {
    let sanitise = |text: &str| {
        text.chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                    ch
                } else {
                    '_'
                }
            })
            .collect::<String>()
    };
    format!("{}-{}", sanitise(component), sanitise(version))
}

#[cfg(unix)]
fn default_socket_endpoint_inner(stem: &str) -> SocketEndpoint {
    let (mut base, apply_namespace) = match runtime_base_directory() {
        Some(dir) => (dir, false),
        None => (fallback_base_directory(), true),
    };

    base.push("bobbin");
    if apply_namespace {
        base.push(user_namespace());
    }

    SocketEndpoint::unix(base.join(format!("{stem}.sock")))
}

#[cfg(unix)]
fn runtime_base_directory() -> Option<Utf8PathBuf> {
    runtime_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

#[cfg(unix)]
fn fallback_base_directory() -> Utf8PathBuf {
    let candidate = env::temp_dir();
    Utf8PathBuf::from_path_buf(candidate).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

#[cfg(unix)]
fn user_namespace() -> String {
    let uid = unsafe { geteuid() };
    format!("uid-{uid}")
}

#[cfg(not(unix))]
fn default_socket_endpoint_inner(_stem: &str) -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_TCP_PORT)
}
