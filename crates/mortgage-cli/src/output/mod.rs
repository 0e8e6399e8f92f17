pub mod csv_out;
pub mod export;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;
use std::io::{self, Write};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Pretty-printed JSON on stdout, newline-terminated.
fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = serde_json::to_writer_pretty(&mut out, value)
        .map_err(io::Error::from)
        .and_then(|_| writeln!(out));
    if let Err(e) = written {
        eprintln!("JSON serialization error: {}", e);
    }
}

/// Render a JSON scalar for tabular output.
pub(crate) fn scalar_text(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The tabular part of a command result: schedule rows, batch results or
/// prepayment summaries, whichever the payload carries.
pub(crate) fn primary_rows(value: &Value) -> Option<&Vec<Value>> {
    let result = value.get("result").unwrap_or(value);
    value
        .get("results")
        .or_else(|| result.get("rows"))
        .or_else(|| result.get("schedule").and_then(|s| s.get("rows")))
        .and_then(Value::as_array)
}
