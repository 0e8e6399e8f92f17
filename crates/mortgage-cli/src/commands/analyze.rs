use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::reporting::analyze_scenario;

use super::analysis_input;
use super::scenario::{resolve_scenario, ScenarioArgs};
use crate::config::MortgageConfig;

/// Arguments for the full scenario analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Annual discount rate for NPV (defaults to config, then the loan rate)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Longest payback (months) still classified as favorable
    #[arg(long)]
    pub payback_threshold: Option<u32>,
}

pub fn run_analyze(args: AnalyzeArgs, config: &MortgageConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = resolve_scenario(&args.scenario)?;
    let input = analysis_input(scenario, args.discount_rate, args.payback_threshold, config);
    let result = analyze_scenario(&input)?;
    Ok(serde_json::to_value(result)?)
}
