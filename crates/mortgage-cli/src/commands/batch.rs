use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::PathBuf;

use mortgage_core::reporting::{analyze_scenario, ScenarioAnalysis};

use super::analysis_input;
use crate::config::{parse_delimiter, MortgageConfig};
use crate::input::sheet;
use crate::output::export::{self, SummaryRecord};

/// Arguments for batch analysis of a scenario sheet
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BatchArgs {
    /// Path to the scenario sheet (CSV)
    #[arg(long)]
    pub scenarios: String,

    /// Field delimiter of the scenario sheet
    #[arg(long, default_value = ",")]
    pub sheet_delimiter: String,

    /// Export directory (defaults to [export] out_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Export field delimiter (defaults to [export] delimiter)
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Annual discount rate for NPV (defaults to config, then each loan's rate)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Longest payback (months) still classified as favorable
    #[arg(long)]
    pub payback_threshold: Option<u32>,

    /// Analyze only; write no files
    #[arg(long)]
    pub no_export: bool,
}

pub fn run_batch(args: BatchArgs, config: &MortgageConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let sheet = sheet::read_sheet(&args.scenarios, parse_delimiter(&args.sheet_delimiter)?)?;
    let mut warnings: Vec<String> = sheet.warnings.iter().map(ToString::to_string).collect();

    let mut analyses: Vec<ScenarioAnalysis> = Vec::with_capacity(sheet.scenarios.len());
    for scenario in sheet.scenarios {
        let name = scenario.name.clone();
        let input = analysis_input(scenario, args.discount_rate, args.payback_threshold, config);
        match analyze_scenario(&input) {
            Ok(output) => {
                warnings.extend(output.warnings.iter().map(|w| format!("{name}: {w}")));
                analyses.push(output.result);
            }
            Err(e) => {
                tracing::warn!(scenario = %name, error = %e, "scenario skipped");
                warnings.push(format!("{name}: skipped ({e})"));
            }
        }
    }

    let records: Vec<SummaryRecord> = analyses.iter().map(SummaryRecord::from).collect();

    let mut exports: Vec<String> = Vec::new();
    if !args.no_export {
        let dir = args.out_dir.unwrap_or_else(|| config.export.out_dir.clone());
        let delimiter = match args.delimiter {
            Some(ref d) => parse_delimiter(d)?,
            None => config.delimiter_byte()?,
        };
        for (i, analysis) in analyses.iter().enumerate() {
            let path = export::export_schedule_file(&dir, i, &analysis.name, &analysis.schedule, delimiter)?;
            exports.push(path.display().to_string());
        }
        let summary = export::export_summary_file(&dir, &records, delimiter)?;
        exports.push(summary.display().to_string());
    }

    Ok(json!({
        "scenarios": records.len(),
        "results": records,
        "warnings": warnings,
        "exports": exports,
    }))
}
