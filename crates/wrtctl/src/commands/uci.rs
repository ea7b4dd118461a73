//! UCI command handlers.

use tabled::Tabled;
use wrtctl_core::{Device, Outcome, StateResult, state};

use crate::cli::{GlobalOpts, UciArgs, UciCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Old")]
    old: String,
    #[tabled(rename = "New")]
    new: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl StateRow {
    fn new(r: &StateResult, color: bool) -> Self {
        let change = |k: &str| r.changes.get(k).cloned().unwrap_or_default();
        Self {
            key: r.name.clone().unwrap_or_default(),
            result: output::paint_outcome(r.result, color),
            old: change("old"),
            new: change("new"),
            comment: r.comment.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(device: &Device, args: UciArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        UciCommand::Dump => {
            let settings = device.config_dump().await?;
            let out = output::render_map(&global.output, &settings, "Key", "Value")?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UciCommand::Get { key } => {
            let value = device.config_get(&key).await?;
            let out = output::render_single(&global.output, &value, String::clone, String::clone)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UciCommand::Set { key, value } => {
            device.config_set(&key, &value).await?;
            if !global.quiet {
                eprintln!("{key} = {value} (committed)");
            }
            Ok(())
        }

        UciCommand::Ensure {
            key,
            value,
            dry_run,
        } => {
            let result = state::config_set(device, Some(key.as_str()), Some(&value), dry_run).await;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                std::slice::from_ref(&result),
                |r| StateRow::new(r, color),
                |r| format!("{}\t{}", r.result, r.comment),
            )?;
            output::print_output(&out, global.quiet);
            if result.result == Outcome::Failed {
                return Err(CliError::StateFailed {
                    key,
                    comment: result.comment,
                });
            }
            Ok(())
        }

        UciCommand::Reload => {
            device.config_reload().await?;
            if !global.quiet {
                eprintln!("Configuration reloaded");
            }
            Ok(())
        }
    }
}
