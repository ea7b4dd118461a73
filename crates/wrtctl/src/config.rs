//! CLI configuration: a thin wrapper around `wrtctl_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--host, --user, --port, ...).

use std::time::Duration;

use wrtctl_core::{DeviceConfig, HostKeyPolicy};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use wrtctl_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a `Profile` + global flags into a `DeviceConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    config: &Config,
    global: &GlobalOpts,
) -> Result<DeviceConfig, CliError> {
    let mut device =
        wrtctl_config::profile_to_device_config(profile, profile_name, &config.defaults)?;
    apply_overrides(&mut device, global);
    Ok(device)
}

/// Build a `DeviceConfig` from flags alone, for a `--host` with no profile.
pub fn from_flags(
    host: &str,
    config: &Config,
    global: &GlobalOpts,
) -> Result<DeviceConfig, CliError> {
    let profile = Profile {
        host: host.to_string(),
        ..Profile::default()
    };
    resolve_profile(&profile, &active_profile_name(global, config), config, global)
}

fn apply_overrides(device: &mut DeviceConfig, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        device.host.clone_from(host);
    }
    if let Some(ref user) = global.user {
        device.username.clone_from(user);
    }
    if let Some(port) = global.port {
        device.port = port;
    }
    if global.accept_host_key {
        device.host_key = HostKeyPolicy::AcceptAny;
    }
    if let Some(secs) = global.timeout {
        device.timeout = Duration::from_secs(secs);
    }
}
