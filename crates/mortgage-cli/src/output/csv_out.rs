use serde_json::Value;
use std::io::{self, Write};

use super::{primary_rows, scalar_text};

/// Write output as CSV to stdout: one record per schedule row or batch
/// result when the payload has them, otherwise `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_csv<W: Write>(writer: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    if let Some(rows) = primary_rows(value) {
        write_array_csv(&mut wtr, rows)?;
    } else {
        let fields = value.get("result").unwrap_or(value);
        wtr.write_record(["field", "value"])?;
        if let Value::Object(map) = fields {
            for (key, val) in map {
                wtr.write_record([key.as_str(), scalar_text(val, "").as_str()])?;
            }
        } else {
            wtr.write_record(["value", scalar_text(fields, "").as_str()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn write_array_csv<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([scalar_text(item, "")])?;
        }
        return Ok(());
    };

    let mut headers: Vec<&str> = first.keys().map(String::as_str).collect();
    for item in arr.iter().skip(1) {
        if let Value::Object(map) = item {
            for key in map.keys() {
                if !headers.contains(&key.as_str()) {
                    headers.push(key.as_str());
                }
            }
        }
    }
    wtr.write_record(&headers)?;

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(|v| scalar_text(v, "")).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}
