// ── Arbitrary commands and reboot ──

use serde_json::Map;
use tracing::{debug, info};

use super::Device;
use crate::error::CoreError;
use crate::model::RunResult;

impl Device {
    /// Run any shell command and report its output and exit status.
    /// A non-zero status is part of the result, not an error.
    pub async fn run(&self, command: &str) -> Result<RunResult, CoreError> {
        let result = RunResult::from(self.check(command).await?);
        debug!(command, exit_code = result.exit_code, "command finished");
        Ok(result)
    }

    /// Ask the device to reboot via `system reboot` on ubus.
    pub async fn reboot(&self) -> Result<(), CoreError> {
        self.ubus("system", "reboot", &Map::new()).await?;
        info!(target_host = %self.config().target(), "reboot requested");
        Ok(())
    }
}
