#![allow(clippy::unwrap_used)]
// Loading, saving, and profile translation against temp config files.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use wrtctl_config::{
    Config, ConfigError, Defaults, Profile, load_config_from, profile_to_device_config,
    save_config_to,
};
use wrtctl_core::HostKeyPolicy;

// ── Helpers ─────────────────────────────────────────────────────────

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

// ── Loading ─────────────────────────────────────────────────────────

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert_eq!(cfg.defaults.output, "table");
    assert_eq!(cfg.defaults.conn_retry, 3);
    assert!(cfg.profiles.is_empty());
}

#[test]
fn parses_profiles_and_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
default_profile = "home"

[defaults]
output = "json"
timeout = 45

[profiles.home]
host = "192.168.1.1"
password_env = "HOME_ROUTER_PW"

[profiles.lab]
host = "10.0.0.2"
port = 2222
username = "admin"
accept_host_key = true
keepalive = 0
"#,
    );

    let cfg = load_config_from(&path).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("home"));
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.timeout, 45);
    assert_eq!(cfg.defaults.connect_timeout, 10);
    assert_eq!(cfg.profiles.len(), 2);
    assert_eq!(cfg.profiles["lab"].port, Some(2222));
    assert_eq!(
        cfg.profiles["home"].password_env.as_deref(),
        Some("HOME_ROUTER_PW")
    );
}

#[test]
fn malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[profiles.home\nhost = 1");

    assert!(matches!(
        load_config_from(&path),
        Err(ConfigError::Figment(_))
    ));
}

#[test]
fn save_then_load_keeps_profiles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.profiles.insert(
        "default".into(),
        Profile {
            host: "openwrt.lan".into(),
            port: Some(22),
            ..Profile::default()
        },
    );
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.profiles["default"].host, "openwrt.lan");
}

// ── Translation ─────────────────────────────────────────────────────

#[test]
fn profile_overrides_defaults() {
    let profile = Profile {
        host: "10.0.0.2".into(),
        port: Some(2222),
        username: Some("admin".into()),
        accept_host_key: Some(true),
        timeout: Some(5),
        keepalive: Some(0),
        ..Profile::default()
    };

    let cfg = profile_to_device_config(&profile, "lab", &Defaults::default()).unwrap();

    assert_eq!(cfg.host, "10.0.0.2");
    assert_eq!(cfg.port, 2222);
    assert_eq!(cfg.username, "admin");
    assert_eq!(cfg.host_key, HostKeyPolicy::AcceptAny);
    assert_eq!(cfg.timeout, Duration::from_secs(5));
    assert_eq!(cfg.connect_timeout, Duration::from_secs(10));
    assert_eq!(cfg.keepalive_interval, None);
    assert_eq!(cfg.conn_retry, 3);
}

#[test]
fn unset_fields_fall_back_to_stock_openwrt() {
    let profile = Profile {
        host: "192.168.1.1".into(),
        ..Profile::default()
    };

    let cfg = profile_to_device_config(&profile, "default", &Defaults::default()).unwrap();

    assert_eq!(cfg.port, 22);
    assert_eq!(cfg.username, "root");
    assert_eq!(cfg.prompt, "root@.+#");
    assert_eq!(cfg.host_key, HostKeyPolicy::KnownHosts);
}

#[test]
fn profile_without_host_is_rejected() {
    let err = profile_to_device_config(&Profile::default(), "empty", &Defaults::default())
        .unwrap_err();

    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));
}
