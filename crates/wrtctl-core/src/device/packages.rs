// ── opkg package management ──

use std::collections::BTreeMap;

use tracing::info;
use wrtctl_api::shell_word;

use super::Device;
use crate::error::CoreError;

impl Device {
    /// Refresh the package index (`opkg update`).
    pub async fn update_packages(&self) -> Result<(), CoreError> {
        self.check_ok("opkg update").await?;
        info!("package index updated");
        Ok(())
    }

    /// Installed packages, name to version.
    pub async fn list_packages(&self) -> Result<BTreeMap<String, String>, CoreError> {
        let output = self.check_ok("opkg list-installed").await?;
        parse_installed(&output.stdout)
    }

    /// Remove one package by name.
    pub async fn remove_package(&self, name: &str) -> Result<(), CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("package name must not be empty"));
        }
        self.check_ok(&format!("opkg remove {}", shell_word(name)))
            .await?;
        info!(package = name, "package removed");
        Ok(())
    }
}

/// Parse `opkg list-installed` output (`name - version` per line).
pub(crate) fn parse_installed(text: &str) -> Result<BTreeMap<String, String>, CoreError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_once(" - ")
                .map(|(name, version)| (name.trim().to_string(), version.trim().to_string()))
                .ok_or_else(|| CoreError::parse("package list", line))
        })
        .collect()
}
