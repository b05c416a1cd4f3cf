//! Output formatting: JSON, YAML, table.
//!
//! Result documents are plain `serde_json::Value`s. Structured formats
//! serialize them as-is; `table` flattens them into key/value rows, or
//! into one row per item for list results.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// One-line verdict for an apply result, e.g. `changed  iam_access_group g-1`.
pub fn status_line(doc: &Value, resource: &str, color: bool) -> String {
    let changed = doc.get("changed").and_then(Value::as_bool).unwrap_or(false);
    let id = doc
        .get("id")
        .and_then(scalar)
        .unwrap_or_else(|| "-".into());
    let label = if changed { "changed" } else { "ok" };

    let label = match (color, changed) {
        (false, _) => label.to_owned(),
        (true, true) => label.yellow().bold().to_string(),
        (true, false) => label.green().bold().to_string(),
    };
    format!("{label}  {resource} {id}")
}

// ── Output settings ──────────────────────────────────────────────────

/// Resolved output settings shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct OutputOpts {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl OutputOpts {
    /// Render `doc` and print it.
    pub fn document(&self, doc: &Value) -> Result<(), CliError> {
        print_output(&render_document(self.format, doc)?, self.quiet);
        Ok(())
    }
}

/// Result document reported when a command fails.
pub fn failure_document(err: &CliError) -> Value {
    serde_json::json!({
        "changed": false,
        "failed": true,
        "msg": err.to_string(),
    })
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a result document in the chosen format.
pub fn render_document(format: OutputFormat, doc: &Value) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(doc)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(doc)?),
        OutputFormat::Yaml => render_yaml(doc),
        OutputFormat::Table => Ok(document_table(doc)),
    }
}

/// Render serializable rows: `Tabled` for tables, serde otherwise.
pub fn render_rows<R>(format: OutputFormat, rows: &[R]) -> Result<String, CliError>
where
    R: Tabled + serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(Table::new(rows).with(Style::rounded()).to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(rows)?),
        OutputFormat::Yaml => render_yaml(rows),
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

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    let out = serde_yaml::to_string(data)?;
    Ok(out.trim_end().to_owned())
}

/// Scalars print bare; arrays and objects print as compact JSON.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

fn cell(value: Option<&Value>) -> String {
    value.and_then(scalar).unwrap_or_default()
}

fn document_table(doc: &Value) -> String {
    match doc {
        Value::Object(map) => {
            // `{ "groups": [{...}, ...] }` from info: one row per item.
            if let [(_, Value::Array(items))] = map.iter().collect::<Vec<_>>().as_slice() {
                if items.iter().all(Value::is_object) {
                    return items_table(items);
                }
            }
            let mut builder = Builder::default();
            builder.push_record(["FIELD", "VALUE"]);
            for (key, value) in map {
                builder.push_record([key.clone(), cell(Some(value))]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        other => cell(Some(other)),
    }
}

fn items_table(items: &[Value]) -> String {
    if items.is_empty() {
        return "(no items)".into();
    }

    let mut columns: Vec<&str> = Vec::new();
    for item in items.iter().filter_map(Value::as_object) {
        for key in item.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_ascii_uppercase()));
    for item in items {
        builder.push_record(columns.iter().map(|c| cell(item.get(*c))));
    }
    builder.build().with(Style::rounded()).to_string()
}
