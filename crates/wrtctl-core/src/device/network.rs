// ── Network service and interface status ──

use serde_json::{Map, Value};
use tracing::info;
use wrtctl_api::UbusReply;

use super::Device;
use crate::error::CoreError;

/// ubus object prefix for logical interfaces.
const INTERFACE_PREFIX: &str = "network.interface.";

impl Device {
    /// `/etc/init.d/network restart`.
    pub async fn network_restart(&self) -> Result<(), CoreError> {
        self.check_ok("/etc/init.d/network restart").await?;
        info!("network restarted");
        Ok(())
    }

    /// `/etc/init.d/network reload`.
    pub async fn network_reload(&self) -> Result<(), CoreError> {
        self.check_ok("/etc/init.d/network reload").await?;
        info!("network reloaded");
        Ok(())
    }

    /// Names of the logical interfaces registered on ubus.
    pub async fn interfaces(&self) -> Result<Vec<String>, CoreError> {
        let output = self.check_ok("ubus list").await?;
        Ok(interface_names(&output.stdout))
    }

    /// `network.device status` for one device (`eth0`, `br-lan`, ...).
    pub async fn device_status(&self, name: &str) -> Result<UbusReply, CoreError> {
        let mut args = Map::new();
        args.insert("name".into(), Value::String(name.to_string()));
        self.ubus("network.device", "status", &args).await
    }

    /// `network.interface.<name> status`.
    pub async fn interface_status(&self, name: &str) -> Result<UbusReply, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("interface name must not be empty"));
        }
        self.ubus(&format!("{INTERFACE_PREFIX}{name}"), "status", &Map::new())
            .await
    }
}

/// Interface names from `ubus list` output.
pub(crate) fn interface_names(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix(INTERFACE_PREFIX))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
