use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use mortgage_core::amortization::build_schedule;
use mortgage_core::indicators::compute_indicators_with_warnings;
use mortgage_core::types::with_metadata;

use super::scenario::{resolve_scenario, ScenarioArgs};
use crate::config::MortgageConfig;

/// Arguments for the appraisal indicators
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct IndicatorsArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Annual discount rate for NPV (defaults to config, then the loan rate)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_indicators(args: IndicatorsArgs, config: &MortgageConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let scenario = resolve_scenario(&args.scenario)?;
    let schedule = build_schedule(&scenario)?;

    let discount_rate = args
        .discount_rate
        .or(config.analysis.discount_rate_annual)
        .unwrap_or(scenario.annual_rate);
    let (set, indicator_warnings) = compute_indicators_with_warnings(&schedule, discount_rate);

    let mut warnings = scenario.warnings();
    warnings.extend(indicator_warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "Borrower cash-flow IRR (Newton with bisection fallback), NPV and payback",
        &scenario,
        warnings,
        elapsed,
        set,
    );
    Ok(serde_json::to_value(output)?)
}
