use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{primary_rows, scalar_text};

/// Format output as tables: the row-shaped part of the payload first
/// (schedule or batch results), then the scalar fields, warnings and
/// methodology.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    if let Some(rows) = primary_rows(value) {
        print_array_table(rows);
        println!();
    }

    let mut fields: Vec<(String, String)> = Vec::new();
    match envelope.get("result") {
        Some(result) => flatten_scalars("", result, &mut fields),
        None => flatten_scalars("", value, &mut fields),
    }
    if !fields.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &fields {
            builder.push_record([key.as_str(), val.as_str()]);
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Array(prepayments)) = envelope
        .get("result")
        .and_then(|r| r.get("prepayments"))
    {
        if !prepayments.is_empty() {
            println!("\nPrepayments:");
            print_array_table(prepayments);
        }
    }

    print_string_list(envelope, "warnings", "Warnings");
    print_string_list(envelope, "exports", "Exported files");

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalars of `value`, nested objects joined with dots. Arrays are left to
/// their own tables, and the envelope's bookkeeping keys are skipped.
fn flatten_scalars(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, val) in map {
        if prefix.is_empty() && matches!(key.as_str(), "warnings" | "methodology" | "metadata" | "assumptions") {
            continue;
        }
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(_) => flatten_scalars(&path, val, out),
            Value::Array(_) => {}
            _ => out.push((path, scalar_text(val, "-"))),
        }
    }
}

fn print_string_list(envelope: &Map<String, Value>, key: &str, title: &str) {
    if let Some(Value::Array(items)) = envelope.get(key) {
        if !items.is_empty() {
            println!("\n{}:", title);
            for item in items {
                println!("  - {}", scalar_text(item, "-"));
            }
        }
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", scalar_text(item, "-"));
        }
        return;
    };

    // Optional fields may be absent from the first row; take the union
    let mut headers: Vec<String> = first.keys().cloned().collect();
    for item in arr.iter().skip(1) {
        if let Value::Object(map) = item {
            for key in map.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(|v| scalar_text(v, "")).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
