use std::ffi::{OsStr, OsString};
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use tempfile::TempDir;

use bobbin_config::{Config, SocketEndpoint, default_socket_endpoint};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        let previous = std::env::var_os(key);
        // Environment mutation is unsafe on edition 2024; the override is
        // restored in `Drop` while the mutex is still held.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

fn write_config(dir: &TempDir, contents: &str) -> OsString {
    let path = dir.path().join("bobbin.toml");
    fs::write(&path, contents).expect("write configuration");
    path.into_os_string()
}

fn args(extra: &[&str]) -> Vec<OsString> {
    std::iter::once("bobbin-worker")
        .chain(extra.iter().copied())
        .map(OsString::from)
        .collect()
}

#[test]
fn file_values_are_loaded() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "component = \"users\"\nversion = \"1.2.0\"\ndisable_compact_names = true\n\
         socket = { transport = \"tcp\", host = \"127.0.0.1\", port = 7100 }\n",
    );
    let mut argv = args(&["--config-path"]);
    argv.push(path);

    let config = Config::load_from_iter(argv).expect("load configuration");
    assert_eq!(config.component(), "users");
    assert_eq!(config.version(), "1.2.0");
    assert!(!config.compact_names());
    assert_eq!(config.socket_endpoint(), SocketEndpoint::tcp("127.0.0.1", 7100));
}

#[test]
fn cli_flags_override_environment() {
    let _env = EnvOverride::set_var("BOBBIN_COMPONENT", OsStr::new("from-env"));
    let config = Config::load_from_iter(args(&[
        "--component",
        "from-cli",
        "--component-version",
        "2.0",
    ]))
    .expect("load configuration");
    assert_eq!(config.component(), "from-cli");
    assert_eq!(config.version(), "2.0");
}

#[test]
fn socket_defaults_to_component_endpoint() {
    let config = Config::load_from_iter(args(&[
        "--component",
        "orders",
        "--component-version",
        "0.3",
    ]))
    .expect("load configuration");
    assert_eq!(config.socket_endpoint(), default_socket_endpoint("orders", "0.3"));
}

#[test]
fn invalid_socket_flag_is_rejected() {
    let result = Config::load_from_iter(args(&["--socket", "ipc://@nowhere"]));
    assert!(result.is_err(), "unsupported scheme must fail to load");
}

#[test]
fn component_version_flag_leaves_builtin_version_alone() {
    let config = Config::load_from_iter(args(&[
        "--component",
        "users",
        "--component-version",
        "4.1",
        "--idle-timeout-ms",
        "500",
    ]))
    .expect("load configuration");
    assert_eq!(config.version(), "4.1");
    assert_eq!(config.idle_timeout_ms, Some(500));
}
