//! Shared configuration for wrtctl.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), and
//! translation to `wrtctl_core::DeviceConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wrtctl_core::{DeviceConfig, HostKeyPolicy};

/// Keyring service name for stored device passwords.
pub const KEYRING_SERVICE: &str = "wrtctl";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "WRTCTL_CONFIG";

/// Environment variable consulted for the password after `password_env`.
pub const PASSWORD_ENV: &str = "WRTCTL_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Seconds to wait for each command's prompt.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds allowed for connect, auth, and shell setup.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Connection attempts per command.
    #[serde(default = "default_conn_retry")]
    pub conn_retry: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            conn_retry: default_conn_retry(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_conn_retry() -> u32 {
    3
}

/// A named device profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Hostname or address of the device.
    pub host: String,

    /// SSH port (default 22).
    pub port: Option<u16>,

    /// Login user (default `root`).
    pub username: Option<String>,

    /// Plaintext password. Keyring or env var take precedence.
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Skip known_hosts verification.
    pub accept_host_key: Option<bool>,

    /// Shell prompt regex (default `root@.+#`).
    pub prompt: Option<String>,

    /// Override connection attempts.
    pub conn_retry: Option<u32>,

    /// Override command timeout (seconds).
    pub timeout: Option<u64>,

    /// Override connect timeout (seconds).
    pub connect_timeout: Option<u64>,

    /// SSH keepalive interval in seconds; 0 disables.
    pub keepalive: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `WRTCTL_CONFIG`, then XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "wrtctl", "wrtctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wrtctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error. Environment keys use `__` as the
/// nesting separator: `WRTCTL_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WRTCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Resolve the device password.
///
/// Chain: profile `password_env` → `WRTCTL_PASSWORD` → system keyring →
/// plaintext in config → empty (factory-fresh OpenWRT has no password).
pub fn resolve_password(profile: &Profile, profile_name: &str) -> SecretString {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return SecretString::from(val);
        }
    }

    // 2. Global env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return SecretString::from(val);
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return SecretString::from(secret);
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return SecretString::from(pw.clone());
    }

    SecretString::from(String::new())
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `DeviceConfig` from a profile, falling back to `defaults` for
/// anything the profile leaves unset. No CLI flag overrides.
pub fn profile_to_device_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("profile '{profile_name}' has no host"),
        });
    }

    let base = DeviceConfig::default();
    let keepalive_interval = match profile.keepalive {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => base.keepalive_interval,
    };
    let host_key = if profile.accept_host_key.unwrap_or(false) {
        HostKeyPolicy::AcceptAny
    } else {
        HostKeyPolicy::KnownHosts
    };

    Ok(DeviceConfig {
        host: profile.host.clone(),
        port: profile.port.unwrap_or(base.port),
        username: profile.username.clone().unwrap_or(base.username),
        password: resolve_password(profile, profile_name),
        host_key,
        prompt: profile.prompt.clone().unwrap_or(base.prompt),
        conn_retry: profile.conn_retry.unwrap_or(defaults.conn_retry),
        retry_backoff: base.retry_backoff,
        connect_timeout: Duration::from_secs(
            profile.connect_timeout.unwrap_or(defaults.connect_timeout),
        ),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        keepalive_interval,
    })
}
