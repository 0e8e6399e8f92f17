use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

use mortgage_core::amortization::build_schedule;
use mortgage_core::types::with_metadata;

use super::scenario::{resolve_scenario, ScenarioArgs};
use crate::config::{parse_delimiter, MortgageConfig};
use crate::output::export;

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Also write the schedule as a delimited file
    #[arg(long)]
    pub export: bool,

    /// Export directory (defaults to [export] out_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Export field delimiter (defaults to [export] delimiter)
    #[arg(long)]
    pub delimiter: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs, config: &MortgageConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let scenario = resolve_scenario(&args.scenario)?;
    let schedule = build_schedule(&scenario)?;
    let elapsed = start.elapsed().as_micros() as u64;

    let exported = if args.export {
        let dir = args.out_dir.unwrap_or_else(|| config.export.out_dir.clone());
        let delimiter = match args.delimiter {
            Some(ref d) => parse_delimiter(d)?,
            None => config.delimiter_byte()?,
        };
        Some(export::export_schedule_file(&dir, 0, &scenario.name, &schedule, delimiter)?)
    } else {
        None
    };

    let output = with_metadata(
        "French-system amortization with geometric monthly rate",
        &scenario,
        scenario.warnings(),
        elapsed,
        schedule,
    );
    let mut value = serde_json::to_value(output)?;
    if let (Some(path), Value::Object(map)) = (exported, &mut value) {
        map.insert("exports".into(), Value::from(vec![path.display().to_string()]));
    }
    Ok(value)
}
