// ── UCI configuration ──
//
// Keys are dotted `package.section.option` paths. Values come back the
// way `uci` prints them: `uci get` unquoted, `uci show` with the shell
// quoting intact (`'192.168.1.1'`, `'a' 'b'` for lists).

use std::collections::BTreeMap;

use tracing::{debug, info};
use wrtctl_api::shell_word;

use super::Device;
use crate::error::CoreError;

impl Device {
    /// Every UCI key on the device (`uci show`).
    pub async fn config_dump(&self) -> Result<BTreeMap<String, String>, CoreError> {
        let output = self.check_ok("uci show").await?;
        parse_show(&output.stdout)
    }

    /// Current value of one key.
    pub async fn config_get(&self, key: &str) -> Result<String, CoreError> {
        validate_key(key)?;
        let output = self.check_ok(&format!("uci get {}", shell_word(key))).await?;
        Ok(output.stdout)
    }

    /// Set a key and commit. A failed `uci set` is not followed by a commit.
    pub async fn config_set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        validate_key(key)?;
        self.check_ok(&format!("uci set {}", shell_word(&format!("{key}={value}"))))
            .await?;
        debug!(key, "uci set staged");
        self.check_ok("uci commit").await?;
        info!(key, value, "uci key committed");
        Ok(())
    }

    /// Apply committed configuration (`reload_config`).
    pub async fn config_reload(&self) -> Result<(), CoreError> {
        self.check_ok("reload_config").await?;
        info!("configuration reloaded");
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), CoreError> {
    if key.trim().is_empty() {
        return Err(CoreError::validation("UCI key must not be empty"));
    }
    if key.contains('=') {
        return Err(CoreError::validation(format!(
            "UCI key {key:?} must not contain '='"
        )));
    }
    Ok(())
}

/// Parse `uci show` output on the first `=` of each line.
pub(crate) fn parse_show(text: &str) -> Result<BTreeMap<String, String>, CoreError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| CoreError::parse("uci show output", line))
        })
        .collect()
}
