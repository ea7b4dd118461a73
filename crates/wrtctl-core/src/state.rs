// ── Declarative UCI reconciliation ──
//
// Brings one UCI key to a desired value and reports the outcome as a
// record rather than an error, so a caller driving many keys can render
// every result to the operator.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::device::Device;

/// Tri-state result of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed,
    /// Dry run: the key differs and would be changed.
    Pending,
}

/// What happened to one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateResult {
    pub name: Option<String>,
    pub result: Outcome,
    /// `old` and `new` values when the key was changed; empty otherwise.
    pub changes: BTreeMap<String, String>,
    pub comment: String,
}

impl StateResult {
    fn new(name: Option<&str>, result: Outcome, comment: String) -> Self {
        Self {
            name: name.map(str::to_string),
            result,
            changes: BTreeMap::new(),
            comment,
        }
    }
}

/// Ensure the UCI key `name` holds `value`, committing if it does not.
///
/// With `dry_run` nothing is written and a differing key reports
/// [`Outcome::Pending`]. A key that cannot be read counts as different.
pub async fn config_set<V: ToString>(
    device: &Device,
    name: Option<&str>,
    value: Option<V>,
    dry_run: bool,
) -> StateResult {
    let Some(key) = name.filter(|n| !n.trim().is_empty()) else {
        return StateResult::new(
            name,
            Outcome::Failed,
            "Must provide name to config_set".into(),
        );
    };
    let Some(value) = value.map(|v| v.to_string()) else {
        return StateResult::new(
            name,
            Outcome::Failed,
            "Must provide value to config_set".into(),
        );
    };

    let current = match device.config_get(key).await {
        Ok(current) => Some(current),
        Err(e) => {
            debug!(key, error = %e, "current value unreadable, treating as different");
            None
        }
    };

    if current.as_deref() == Some(value.as_str()) {
        return StateResult::new(
            name,
            Outcome::Succeeded,
            format!("UCI key {key} already set to {value}"),
        );
    }

    if dry_run {
        return StateResult::new(
            name,
            Outcome::Pending,
            format!("UCI key {key} will change to {value}"),
        );
    }

    match device.config_set(key, &value).await {
        Ok(()) => {
            let mut result = StateResult::new(
                name,
                Outcome::Succeeded,
                format!("UCI key {key} changed to {value}"),
            );
            result
                .changes
                .insert("old".into(), current.unwrap_or_default());
            result.changes.insert("new".into(), value);
            result
        }
        Err(e) => {
            warn!(key, error = %e, "uci set failed");
            StateResult::new(
                name,
                Outcome::Failed,
                format!("Failed to change UCI key {key} to {value}: {e}"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_renders_lowercase() {
        assert_eq!(Outcome::Pending.to_string(), "pending");
        assert_eq!(
            serde_json::to_string(&Outcome::Succeeded).unwrap_or_default(),
            "\"succeeded\""
        );
    }
}
