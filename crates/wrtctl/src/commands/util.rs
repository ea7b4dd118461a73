//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::error::CliError;

/// Ask before a destructive action. `--yes` skips the prompt; without it a
/// non-interactive stdin is refused rather than assumed.
pub fn confirm(message: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.to_string(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Validation {
            field: "confirmation".into(),
            reason: format!("prompt failed: {e}"),
        })
}

/// Join `wrtctl run` arguments into the single line sent to the shell.
pub fn command_line(parts: &[String]) -> String {
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_skips_prompt() {
        assert!(matches!(confirm("Reboot gw?", true), Ok(true)));
    }

    #[test]
    fn arguments_are_joined_verbatim() {
        let parts = vec!["cat".to_string(), "/etc/os-release".to_string(), "|".to_string(), "head".to_string()];
        assert_eq!(command_line(&parts), "cat /etc/os-release | head");
    }
}
