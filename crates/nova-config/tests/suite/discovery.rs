use std::ffi::OsString;
use std::sync::Mutex;

use nova_config::{discover_config_path, load_for_workspace, NovaConfig, NOVA_CONFIG_ENV_VAR};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set_os(key: &'static str, value: &OsString) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_nova_toml_in_workspace_root() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("nova.toml");
    std::fs::write(&config_path, "[highlighting]\nreport_unchecked = false\n").unwrap();

    let discovered = discover_config_path(dir.path())
        .expect("nova.toml should be discovered when present in workspace root");
    assert_eq!(discovered, config_path.canonicalize().unwrap_or(config_path));
}

#[test]
fn env_override_wins_over_workspace_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("nova.toml"),
        "[highlighting]\nreport_unchecked = true\n",
    )
    .unwrap();

    let override_path = dir.path().join("override.toml");
    std::fs::write(
        &override_path,
        "[highlighting]\nreport_unchecked = false\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let _env = EnvVarGuard::set_os(NOVA_CONFIG_ENV_VAR, &OsString::from("override.toml"));

    let (config, path, diagnostics) = load_for_workspace(dir.path()).unwrap();
    assert!(!config.highlighting.report_unchecked);
    assert_eq!(config.logging.level, "debug");
    assert!(diagnostics.is_empty());
    assert_eq!(
        path.expect("load_for_workspace should return the resolved config path"),
        override_path.canonicalize().unwrap_or(override_path)
    );
}

#[test]
fn missing_config_returns_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, path, diagnostics) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(path, None);
    assert_eq!(config, NovaConfig::default());
    assert!(diagnostics.is_empty());
}
