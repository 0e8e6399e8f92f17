//! Scenario sheet (CSV) reader.
//!
//! Headers are trimmed, lower-cased and mapped onto canonical names, so
//! sheets written with the Spanish column titles (`nombre`, `monto`,
//! `tasa`, `plazo`, `seguro`, `fecha inicio`, `mes_aporte_1`, ...) load the
//! same as English ones. A row that cannot be turned into a valid scenario
//! is skipped with a [`SourceParseWarning`].

use chrono::{NaiveDate, NaiveDateTime};
use mortgage_core::amortization::{InsuranceCharge, Prepayment, PrepaymentMode, Scenario};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

use super::file::resolve_path;

const REQUIRED_COLUMNS: [&str; 6] = ["name", "amount", "rate", "term", "insurance", "start_date"];
const MAX_PREPAYMENT_COLUMNS: u32 = 10;

/// A sheet row that was skipped, or partially read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceParseWarning {
    /// 1-based line in the sheet, the header being line 1.
    pub row: usize,
    pub message: String,
}

impl std::fmt::Display for SourceParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Failed to read scenario sheet: {0}")]
    Csv(#[from] csv::Error),

    #[error("Scenario sheet is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No valid scenario found in the sheet ({} rows skipped)", .0.len())]
    NoValidScenarios(Vec<SourceParseWarning>),
}

#[derive(Debug)]
pub struct ScenarioSheet {
    pub scenarios: Vec<Scenario>,
    pub warnings: Vec<SourceParseWarning>,
}

pub fn read_sheet(path: &str, delimiter: u8) -> Result<ScenarioSheet, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let file = File::open(&canonical)
        .map_err(|e| format!("Failed to open '{}': {}", canonical.display(), e))?;
    Ok(parse_sheet(file, delimiter)?)
}

pub fn parse_sheet<R: Read>(reader: R, delimiter: u8) -> Result<ScenarioSheet, SheetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(canonical_column).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SheetError::MissingColumns(missing));
    }

    let mut scenarios = Vec::new();
    let mut warnings = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let row_number = i + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warnings.push(SourceParseWarning {
                    row: row_number,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let cells: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .filter(|(_, v)| !v.is_empty())
            .collect();
        let row = SheetRow { cells };

        match row.to_scenario() {
            Ok((scenario, notes)) => {
                warnings.extend(notes.into_iter().map(|message| SourceParseWarning {
                    row: row_number,
                    message,
                }));
                scenarios.push(scenario);
            }
            Err(message) => {
                tracing::warn!(row = row_number, %message, "skipping sheet row");
                warnings.push(SourceParseWarning {
                    row: row_number,
                    message,
                });
            }
        }
    }

    if scenarios.is_empty() {
        return Err(SheetError::NoValidScenarios(warnings));
    }

    Ok(ScenarioSheet {
        scenarios,
        warnings,
    })
}

/// Map a raw header onto its canonical column name.
fn canonical_column(header: &str) -> String {
    let h = header.trim().to_lowercase();
    let mapped = match h.as_str() {
        "nombre" | "escenario" | "name" => "name",
        "monto" | "amount" | "principal" => "amount",
        "tasa" | "tasa (%)" | "rate" => "rate",
        "plazo" | "term" => "term",
        "seguro" | "insurance" => "insurance",
        "fecha inicio" | "fecha" | "start date" | "start_date" => "start_date",
        "mes aporte" | "mes_aporte" | "prepayment_month" => "prepayment_month",
        "monto aporte" | "monto_aporte" | "prepayment_amount" => "prepayment_amount",
        "modo aporte" | "modo_aporte" | "tipo reduccion" | "prepayment_mode" => "prepayment_mode",
        _ => return numbered_prepayment_column(&h).unwrap_or(h),
    };
    mapped.to_string()
}

/// `mes_aporte_3` -> `prepayment_month_3`, and so on for amount and mode.
fn numbered_prepayment_column(h: &str) -> Option<String> {
    const PREFIXES: [(&str, &str); 6] = [
        ("mes_aporte_", "prepayment_month_"),
        ("monto_aporte_", "prepayment_amount_"),
        ("modo_aporte_", "prepayment_mode_"),
        ("prepayment_month_", "prepayment_month_"),
        ("prepayment_amount_", "prepayment_amount_"),
        ("prepayment_mode_", "prepayment_mode_"),
    ];
    PREFIXES.iter().find_map(|(from, to)| {
        let j: u32 = h.strip_prefix(from)?.parse().ok()?;
        (1..=MAX_PREPAYMENT_COLUMNS)
            .contains(&j)
            .then(|| format!("{to}{j}"))
    })
}

struct SheetRow<'a> {
    cells: HashMap<&'a str, &'a str>,
}

impl SheetRow<'_> {
    fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).copied()
    }

    fn required(&self, column: &str) -> Result<&str, String> {
        self.get(column).ok_or_else(|| format!("missing value for '{column}'"))
    }

    /// The scenario plus non-fatal notes about ignored prepayment cells.
    fn to_scenario(&self) -> Result<(Scenario, Vec<String>), String> {
        let mut notes = Vec::new();
        let name = self.required("name")?.to_string();
        let principal = parse_decimal("amount", self.required("amount")?)?;
        let annual_rate = parse_decimal("rate", self.required("rate")?)?;
        let term_months = parse_month("term", self.required("term")?)?;
        let insurance = parse_decimal("insurance", self.required("insurance")?)?;
        let start_date = parse_date(self.required("start_date")?)?;

        let mut contributions = Vec::new();
        for j in 1..=MAX_PREPAYMENT_COLUMNS {
            let month = self.get(&format!("prepayment_month_{j}"));
            let amount = self.get(&format!("prepayment_amount_{j}"));
            let mode = self.get(&format!("prepayment_mode_{j}"));
            if let (Some(month), Some(amount)) = (month, amount) {
                match parse_prepayment(month, amount, mode) {
                    Ok(Some(p)) => contributions.push(p),
                    Ok(None) => {}
                    Err(e) => notes.push(format!("prepayment {j} ignored: {e}")),
                }
            }
        }

        if contributions.is_empty() {
            if let Some(month) = self.get("prepayment_month") {
                let amount = self.get("prepayment_amount").unwrap_or("0");
                match parse_prepayment(month, amount, self.get("prepayment_mode")) {
                    Ok(Some(p)) => contributions.push(p),
                    Ok(None) => notes.push("prepayment ignored: month and amount must be positive".into()),
                    Err(e) => notes.push(format!("prepayment ignored: {e}")),
                }
            }
        }

        let scenario = Scenario {
            name,
            principal,
            annual_rate,
            term_months,
            insurance: InsuranceCharge::PerPeriod(insurance),
            start_date,
            contributions,
        };
        scenario.validate().map_err(|e| e.to_string())?;
        Ok((scenario, notes))
    }
}

/// `Ok(None)` for a non-positive month or amount.
fn parse_prepayment(month: &str, amount: &str, mode: Option<&str>) -> Result<Option<Prepayment>, String> {
    let month_value = parse_decimal("month", month)?;
    let amount = parse_decimal("amount", amount)?;
    if month_value <= Decimal::ZERO || amount <= Decimal::ZERO {
        return Ok(None);
    }
    let mode = match mode {
        Some(m) => PrepaymentMode::from_str(m).map_err(|e| e.to_string())?,
        None => PrepaymentMode::Term,
    };
    Ok(Some(Prepayment {
        month: parse_month("month", month)?,
        amount,
        mode,
    }))
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | '_' | ' ')).collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| format!("'{raw}' is not a number for '{column}'"))
}

/// Whole months; a fractional part is truncated (`12.0` -> 12).
fn parse_month(column: &str, raw: &str) -> Result<u32, String> {
    parse_decimal(column, raw)?
        .trunc()
        .to_u32()
        .ok_or_else(|| format!("'{raw}' is not a month count for '{column}'"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(d);
        }
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .map_err(|_| format!("'{raw}' is not a date (expected YYYY-MM-DD)"))
}
