// ── Runtime connection configuration ──
//
// These types describe *how* to reach one OpenWRT device. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `DeviceConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use wrtctl_api::{DEFAULT_PROMPT, HostKeyPolicy, RetryPolicy, SshConfig};

/// Configuration for managing a single device.
///
/// Built by the CLI, passed to [`Device`](crate::Device). Core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Hostname or address of the device.
    pub host: String,
    /// SSH port.
    pub port: u16,
    /// Login user (stock images only have `root`).
    pub username: String,
    /// Login password. Empty is valid for a factory-fresh device.
    pub password: SecretString,
    /// Host-key verification strategy.
    pub host_key: HostKeyPolicy,
    /// Shell prompt regex.
    pub prompt: String,
    /// Connection attempts per command before giving up.
    pub conn_retry: u32,
    /// Pause between connection attempts.
    pub retry_backoff: Duration,
    /// Upper bound on TCP connect, auth, and shell setup.
    pub connect_timeout: Duration,
    /// Upper bound on waiting for each command's prompt.
    pub timeout: Duration,
    /// SSH keepalive interval. `None` disables keepalives.
    pub keepalive_interval: Option<Duration>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.1".into(),
            port: 22,
            username: "root".into(),
            password: SecretString::from(String::new()),
            host_key: HostKeyPolicy::KnownHosts,
            prompt: DEFAULT_PROMPT.into(),
            conn_retry: 3,
            retry_backoff: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            keepalive_interval: Some(Duration::from_secs(30)),
        }
    }
}

impl DeviceConfig {
    pub(crate) fn ssh_config(&self) -> SshConfig {
        SshConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            host_key: self.host_key,
            prompt: self.prompt.clone(),
            connect_timeout: self.connect_timeout,
            read_timeout: self.timeout,
            keepalive_interval: self.keepalive_interval,
            ..SshConfig::default()
        }
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.conn_retry,
            backoff: self.retry_backoff,
        }
    }

    /// `user@host:port`, for log lines and error messages.
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}
