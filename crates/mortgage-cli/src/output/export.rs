//! Delimited-file exports: one schedule file per scenario and a summary
//! file for a batch.

use mortgage_core::amortization::Schedule;
use mortgage_core::reporting::ScenarioAnalysis;
use mortgage_core::types::{Money, Months, Rate};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "summary.csv";

const SCHEDULE_HEADERS: [&str; 12] = [
    "month",
    "date",
    "opening_balance",
    "payment",
    "interest",
    "principal_paid",
    "balance",
    "insurance",
    "net_cash_flow",
    "prepayment_applied",
    "prepayment_amount",
    "recomputed_payment",
];

/// One line of the batch summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub name: String,
    pub irr_annual: Option<Rate>,
    pub cet_annual: Option<Rate>,
    pub npv: Option<Money>,
    pub payback_months: Option<Months>,
    pub discounted_payback_months: Option<Months>,
    pub classification: String,
    pub payoff_month: Option<Months>,
    pub months_saved: Months,
    pub interest_saved: Money,
}

impl From<&ScenarioAnalysis> for SummaryRecord {
    fn from(a: &ScenarioAnalysis) -> Self {
        Self {
            name: a.name.clone(),
            irr_annual: a.indicators.irr_annual,
            cet_annual: a.indicators.cet_annual,
            npv: a.indicators.npv,
            payback_months: a.indicators.payback_months,
            discounted_payback_months: a.indicators.discounted_payback_months,
            classification: a.classification.label().to_string(),
            payoff_month: a.schedule.payoff_month,
            months_saved: a.schedule.months_saved,
            interest_saved: a.baseline.interest_saved,
        }
    }
}

pub fn write_schedule<W: Write>(writer: W, schedule: &Schedule, delimiter: u8) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    wtr.write_record(SCHEDULE_HEADERS)?;
    for row in &schedule.rows {
        wtr.write_record([
            row.month.to_string(),
            row.date.to_string(),
            row.opening_balance.to_string(),
            row.payment.to_string(),
            row.interest.to_string(),
            row.principal_paid.to_string(),
            row.balance.to_string(),
            row.insurance.to_string(),
            row.net_cash_flow.to_string(),
            row.prepayment_applied.to_string(),
            row.prepayment_amount.to_string(),
            row.recomputed_payment.map(|p| p.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary<W: Write>(writer: W, records: &[SummaryRecord], delimiter: u8) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `schedule_<nn>_<name>.csv` under `dir`, creating it if needed.
pub fn export_schedule_file(
    dir: &Path,
    index: usize,
    name: &str,
    schedule: &Schedule,
    delimiter: u8,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create '{}': {}", dir.display(), e))?;
    let path = dir.join(format!("schedule_{:02}_{}.csv", index + 1, file_stem(name)));
    let file = File::create(&path)
        .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;
    write_schedule(file, schedule, delimiter)?;
    tracing::info!(path = %path.display(), "schedule exported");
    Ok(path)
}

pub fn export_summary_file(
    dir: &Path,
    records: &[SummaryRecord],
    delimiter: u8,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create '{}': {}", dir.display(), e))?;
    let path = dir.join(SUMMARY_FILE);
    let file = File::create(&path)
        .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;
    write_summary(file, records, delimiter)?;
    tracing::info!(path = %path.display(), scenarios = records.len(), "summary exported");
    Ok(path)
}

/// Lower-case ASCII alphanumerics, everything else collapsed to `_`.
fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_matches('_').to_string();
    if stem.is_empty() {
        "scenario".to_string()
    } else {
        stem
    }
}
