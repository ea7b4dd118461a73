// SSH transport built on russh
//
// Opens one interactive shell per connection: TCP connect, host-key
// check, password auth, PTY + shell request, then reads past the login
// banner to the first prompt. Each `send_line` writes one line and reads
// until the incomplete last line of the buffer matches the prompt regex.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use russh::client::{self, Handle, Msg};
use russh::keys::ssh_key::PublicKey;
use russh::{Channel, ChannelMsg, Disconnect};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::Error;
use crate::framing::normalize;
use crate::transport::{Connector, Transcript, Transport};

/// Prompt printed by a stock OpenWRT root shell (`root@OpenWrt:~# `).
pub const DEFAULT_PROMPT: &str = "root@.+#";

/// How to treat the device's host key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Verify against the user's `~/.ssh/known_hosts`.
    #[default]
    KnownHosts,
    /// Accept whatever key the device presents.
    AcceptAny,
}

/// Everything needed to open a shell on one device.
#[derive(Debug, Clone)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub host_key: HostKeyPolicy,
    /// Regex matched against the last, unterminated line of output.
    pub prompt: String,
    pub connect_timeout: Duration,
    /// Upper bound on waiting for the next prompt.
    pub read_timeout: Duration,
    pub keepalive_interval: Option<Duration>,
    /// PTY width; wide enough that echoed commands never wrap.
    pub pty_columns: u32,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.1".into(),
            port: 22,
            username: "root".into(),
            password: SecretString::from(String::new()),
            host_key: HostKeyPolicy::default(),
            prompt: DEFAULT_PROMPT.into(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            keepalive_interval: Some(Duration::from_secs(30)),
            pty_columns: 4096,
        }
    }
}

/// Opens russh-backed interactive shells.
#[derive(Debug, Clone)]
pub struct SshConnector {
    config: SshConfig,
    prompt: Regex,
}

impl SshConnector {
    /// Validate the prompt pattern up front so a bad config fails fast.
    pub fn new(config: SshConfig) -> Result<Self, Error> {
        let prompt = Regex::new(&config.prompt)?;
        Ok(Self { config, prompt })
    }

    async fn connect(&self) -> Result<SshShell, Error> {
        let cfg = &self.config;
        let client_config = Arc::new(client::Config {
            keepalive_interval: cfg.keepalive_interval,
            ..Default::default()
        });
        let handler = ClientHandler {
            host: cfg.host.clone(),
            port: cfg.port,
            policy: cfg.host_key,
        };

        let mut handle = client::connect(client_config, (cfg.host.as_str(), cfg.port), handler)
            .await
            .map_err(|e| Error::Connect {
                host: cfg.host.clone(),
                reason: e.to_string(),
            })?;

        let auth = handle
            .authenticate_password(cfg.username.as_str(), cfg.password.expose_secret())
            .await?;
        if !auth.success() {
            return Err(Error::Authentication {
                host: cfg.host.clone(),
                username: cfg.username.clone(),
            });
        }

        let channel = handle.channel_open_session().await?;
        channel
            .request_pty(false, "vt100", cfg.pty_columns, 24, 0, 0, &[])
            .await?;
        channel.request_shell(false).await?;

        let mut shell = SshShell {
            handle,
            channel,
            prompt: self.prompt.clone(),
            read_timeout: cfg.read_timeout,
        };

        // Swallow the login banner up to the first prompt.
        let banner = shell.read_timed().await?;
        debug!(bytes = banner.stdout.len(), "shell ready");
        Ok(shell)
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn open(&self) -> Result<Box<dyn Transport>, Error> {
        let timeout = self.config.connect_timeout;
        match tokio::time::timeout(timeout, self.connect()).await {
            Ok(shell) => Ok(Box::new(shell?)),
            Err(_) => Err(Error::ConnectTimeout {
                host: self.config.host.clone(),
                timeout_secs: timeout.as_secs(),
            }),
        }
    }

    fn target(&self) -> String {
        format!(
            "{}@{}:{}",
            self.config.username, self.config.host, self.config.port
        )
    }
}

// ── Shell ────────────────────────────────────────────────────────────

struct SshShell {
    handle: Handle<ClientHandler>,
    channel: Channel<Msg>,
    prompt: Regex,
    read_timeout: Duration,
}

impl SshShell {
    async fn read_timed(&mut self) -> Result<Transcript, Error> {
        let timeout = self.read_timeout;
        tokio::time::timeout(timeout, self.read_until_prompt())
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: timeout.as_secs(),
            })?
    }

    async fn read_until_prompt(&mut self) -> Result<Transcript, Error> {
        let mut stdout: Vec<u8> = Vec::new();
        let mut stderr: Vec<u8> = Vec::new();

        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                    if ends_with_prompt(&self.prompt, &stdout) {
                        break;
                    }
                }
                Some(ChannelMsg::ExtendedData { data, .. }) => stderr.extend_from_slice(&data),
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    return Err(Error::ChannelClosed);
                }
                Some(_) => {}
            }
        }

        Ok(Transcript {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

#[async_trait]
impl Transport for SshShell {
    async fn send_line(&mut self, line: &str) -> Result<Transcript, Error> {
        let data = format!("{line}\n");
        self.channel.data(data.as_bytes()).await?;
        self.read_timed().await
    }

    async fn close(&mut self) -> Result<(), Error> {
        if let Err(e) = self.channel.eof().await {
            debug!(error = %e, "eof on closing channel failed");
        }
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

/// Whether the unterminated tail of `buf` looks like a shell prompt.
fn ends_with_prompt(prompt: &Regex, buf: &[u8]) -> bool {
    let tail = match buf.iter().rposition(|&b| b == b'\n') {
        Some(pos) => &buf[pos + 1..],
        None => buf,
    };
    if tail.is_empty() {
        return false;
    }
    prompt.is_match(&normalize(&String::from_utf8_lossy(tail)))
}

// ── Host key handling ────────────────────────────────────────────────

struct ClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        match self.policy {
            HostKeyPolicy::AcceptAny => Ok(true),
            HostKeyPolicy::KnownHosts => {
                match russh::keys::check_known_hosts(&self.host, self.port, server_public_key) {
                    Ok(true) => Ok(true),
                    Ok(false) => {
                        warn!(host = %self.host, "host key not found in known_hosts");
                        Ok(false)
                    }
                    Err(e) => {
                        warn!(host = %self.host, error = %e, "host key verification failed");
                        Ok(false)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Regex {
        Regex::new(DEFAULT_PROMPT).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn detects_prompt_on_last_line() {
        assert!(ends_with_prompt(&prompt(), b"echo 1234\r\n1234\r\nroot@OpenWrt:~# "));
    }

    #[test]
    fn ignores_prompt_text_on_finished_lines() {
        assert!(!ends_with_prompt(&prompt(), b"root@OpenWrt:~# \r\n"));
        assert!(!ends_with_prompt(&prompt(), b"echo 1234\r\n12"));
    }

    #[test]
    fn partial_prompt_is_not_enough() {
        assert!(!ends_with_prompt(&prompt(), b"uname\r\nroot@Open"));
    }

    #[test]
    fn default_config_targets_root_on_port_22() {
        let cfg = SshConfig::default();
        assert_eq!(cfg.username, "root");
        assert_eq!(cfg.port, 22);
        assert_eq!(cfg.host_key, HostKeyPolicy::KnownHosts);
    }
}
