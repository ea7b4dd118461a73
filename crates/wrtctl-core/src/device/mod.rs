// ── Device facade ──
//
// Full lifecycle management for one OpenWRT device: a single serialized
// shell session, the ubus bridge on top of it, and the memoized fact
// set. The management operations live in the submodules as further
// `impl Device` blocks.

mod facts;
mod network;
mod packages;
mod system;
mod uci;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use wrtctl_api::{CommandOutput, Connector, Session, SshConnector, UbusReply, shell_word};

use crate::config::DeviceConfig;
use crate::error::CoreError;
use crate::model::Facts;

pub use facts::{parse_mtd, parse_osarch};

// ── Device ───────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DeviceInner>`. Every clone shares one shell
/// session; commands from concurrent callers queue on its mutex because
/// the channel cannot tell interleaved replies apart.
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

struct DeviceInner {
    config: DeviceConfig,
    session: Mutex<Session>,
    /// Fact set for the current connection. Swapped whole, never edited.
    facts: ArcSwapOption<Facts>,
}

impl Device {
    /// Create a device handle over SSH. Does NOT connect; the first
    /// command (or [`connect()`](Self::connect)) opens the session.
    pub fn new(config: DeviceConfig) -> Result<Self, CoreError> {
        let connector = SshConnector::new(config.ssh_config())?;
        Ok(Self::with_connector(config, Arc::new(connector)))
    }

    /// Create a device handle over any [`Connector`].
    pub fn with_connector(config: DeviceConfig, connector: Arc<dyn Connector>) -> Self {
        let session = Session::new(connector, config.retry_policy());
        Self {
            inner: Arc::new(DeviceInner {
                config,
                session: Mutex::new(session),
                facts: ArcSwapOption::empty(),
            }),
        }
    }

    /// Access the device configuration.
    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Open (or re-validate) the shell session.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner.session.lock().await.ensure_connected().await?;
        info!(target_host = %self.inner.config.target(), "connected to device");
        Ok(())
    }

    /// Close the shell session and forget the cached facts.
    ///
    /// Safe to call when not connected. A failed SSH disconnect is logged
    /// and otherwise ignored: the handle is dropped either way.
    pub async fn disconnect(&self) {
        if let Err(e) = self.inner.session.lock().await.close().await {
            warn!(error = %e, "SSH disconnect failed (non-fatal)");
        }
        self.inner.facts.store(None);
        debug!("disconnected");
    }

    /// Whether a transport is currently held.
    pub async fn is_connected(&self) -> bool {
        self.inner.session.lock().await.is_connected()
    }

    /// Liveness check. Connects if needed; never errors.
    pub async fn ping(&self) -> bool {
        match self.inner.session.lock().await.ensure_connected().await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "ping failed");
                false
            }
        }
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: DeviceConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Device) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        Device::new(config)?.scoped(f).await
    }

    /// Connect, run closure, disconnect, on this handle. The session is
    /// closed whether or not the closure succeeds.
    pub async fn scoped<F, Fut, T>(self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Device) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        self.connect().await?;
        let result = f(self.clone()).await;
        self.disconnect().await;
        result
    }

    // ── Command primitives ───────────────────────────────────────────

    /// Run a command without exit-status capture and return its output.
    pub async fn shell(&self, command: &str) -> Result<String, CoreError> {
        Ok(self.inner.session.lock().await.send_raw(command).await?)
    }

    /// Run a command and capture its exit status. A non-zero status is
    /// not an error here.
    pub async fn check(&self, command: &str) -> Result<CommandOutput, CoreError> {
        Ok(self.inner.session.lock().await.send_checked(command).await?)
    }

    /// Call a ubus method.
    pub async fn ubus(
        &self,
        path: &str,
        method: &str,
        args: &Map<String, Value>,
    ) -> Result<UbusReply, CoreError> {
        Ok(self
            .inner
            .session
            .lock()
            .await
            .ubus(path, method, args)
            .await?)
    }

    /// Contents of a file on the device.
    pub async fn file_content(&self, path: &str) -> Result<String, CoreError> {
        self.shell(&format!("cat {}", shell_word(path))).await
    }

    /// Checked command that must exit 0.
    pub(crate) async fn check_ok(&self, command: &str) -> Result<CommandOutput, CoreError> {
        let output = self.check(command).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(CoreError::CommandFailed {
                command: command.to_string(),
                exit_code: output.exit_code.unwrap_or(-1),
                output: output.stdout,
            })
        }
    }
}
