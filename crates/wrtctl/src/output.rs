//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use wrtctl_core::Outcome;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Outcome label, green / red / yellow when color is on.
pub fn paint_outcome(outcome: Outcome, color: bool) -> String {
    let label = outcome.to_string();
    if !color {
        return label;
    }
    match outcome {
        Outcome::Succeeded => label.green().to_string(),
        Outcome::Failed => label.red().to_string(),
        Outcome::Pending => label.yellow().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Render a flat key/value map. Tables get two columns, plain emits
/// `key=value` lines.
pub fn render_map(
    format: &OutputFormat,
    data: &BTreeMap<String, String>,
    key_header: &str,
    value_header: &str,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let mut builder = tabled::builder::Builder::default();
            builder.push_record([key_header, value_header]);
            for (key, value) in data {
                builder.push_record([key.as_str(), value.as_str()]);
            }
            Ok(builder.build().with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render an arbitrary JSON document (ubus replies). Table and plain fall
/// back to pretty JSON since the shape is not known.
pub fn render_value(format: &OutputFormat, data: &serde_json::Value) -> Result<String, CliError> {
    match format {
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Table | OutputFormat::Json | OutputFormat::Plain => render_json(data, false),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Internal(format!("JSON rendering failed: {e}")))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data)
        .map_err(|e| CliError::Internal(format!("YAML rendering failed: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plain_map_renders_key_value_lines() {
        let data = BTreeMap::from([
            ("base-files".to_string(), "1554-r23497".to_string()),
            ("busybox".to_string(), "1.36.1-1".to_string()),
        ]);
        let out = render_map(&OutputFormat::Plain, &data, "Package", "Version").unwrap();
        assert_eq!(out, "base-files=1554-r23497\nbusybox=1.36.1-1");
    }

    #[test]
    fn table_map_has_headers() {
        let data = BTreeMap::from([("dropbear".to_string(), "2022.82-5".to_string())]);
        let out = render_map(&OutputFormat::Table, &data, "Package", "Version").unwrap();
        assert!(out.contains("Package"));
        assert!(out.contains("dropbear"));
    }

    #[test]
    fn compact_json_is_single_line() {
        let value = serde_json::json!({"up": true, "device": "br-lan"});
        let out = render_value(&OutputFormat::JsonCompact, &value).unwrap();
        assert!(!out.contains('\n'));
    }

    #[test]
    fn outcome_without_color_is_bare_label() {
        assert_eq!(paint_outcome(Outcome::Pending, false), "pending");
    }
}
