use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use std::str::FromStr;

use mortgage_core::amortization::{InsuranceCharge, Prepayment, PrepaymentMode, Scenario};

use crate::input;

/// Scenario source shared by the single-scenario commands
#[derive(Args, Debug, Default)]
pub struct ScenarioArgs {
    /// Path to a JSON or YAML scenario file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Scenario label
    #[arg(long)]
    pub name: Option<String>,

    /// Loan amount disbursed at month 0
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Effective annual rate (e.g. 0.1095 for 10.95% EA)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Total insurance premium, spread evenly over the term
    #[arg(long, conflicts_with = "insurance_monthly")]
    pub insurance_total: Option<Decimal>,

    /// Insurance charged every month
    #[arg(long)]
    pub insurance_monthly: Option<Decimal>,

    /// Date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Prepayment as MONTH:AMOUNT[:MODE], MODE being term (default) or
    /// payment. Repeatable; added to the scenario from any source.
    #[arg(long = "prepayment", value_parser = parse_prepayment)]
    pub prepayments: Vec<Prepayment>,
}

/// Parse `MONTH:AMOUNT[:MODE]`.
pub fn parse_prepayment(s: &str) -> Result<Prepayment, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let (month, amount, mode) = match parts.as_slice() {
        [m, a] => (*m, *a, None),
        [m, a, mode] => (*m, *a, Some(*mode)),
        _ => return Err(format!("expected MONTH:AMOUNT[:MODE], got '{s}'")),
    };

    let month: u32 = month
        .parse()
        .map_err(|_| format!("invalid prepayment month '{month}'"))?;
    let amount = Decimal::from_str(amount).map_err(|_| format!("invalid prepayment amount '{amount}'"))?;
    let mode = match mode {
        Some(m) => PrepaymentMode::from_str(m).map_err(|e| e.to_string())?,
        None => PrepaymentMode::default(),
    };

    Ok(Prepayment {
        month,
        amount,
        mode,
    })
}

/// Resolve the scenario from `--input`, piped JSON or the individual flags,
/// in that order. `--prepayment` flags are appended in every case.
pub fn resolve_scenario(args: &ScenarioArgs) -> Result<Scenario, Box<dyn std::error::Error>> {
    let mut scenario: Scenario = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        scenario_from_flags(args)?
    };

    if let Some(ref name) = args.name {
        scenario.name = name.clone();
    }
    scenario.contributions.extend(args.prepayments.iter().cloned());
    Ok(scenario)
}

pub fn scenario_from_flags(args: &ScenarioArgs) -> Result<Scenario, Box<dyn std::error::Error>> {
    let insurance = match (args.insurance_total, args.insurance_monthly) {
        (_, Some(monthly)) => InsuranceCharge::PerPeriod(monthly),
        (Some(total), None) => InsuranceCharge::Total(total),
        (None, None) => InsuranceCharge::default(),
    };

    Ok(Scenario {
        name: args.name.clone().unwrap_or_else(|| "Scenario".to_string()),
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate: args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?,
        term_months: args.term.ok_or("--term is required (or provide --input)")?,
        insurance,
        start_date: args
            .start_date
            .ok_or("--start-date is required (or provide --input)")?,
        contributions: Vec::new(),
    })
}
