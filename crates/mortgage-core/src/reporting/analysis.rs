//! End-to-end scenario analysis: schedule, indicators, verdict, per-event
//! summaries and a comparison against the same loan without prepayments.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::classification::{classify, Classification, ClassificationRules};
use super::prepayment_summary::{summarize_prepayments, PrepaymentSummary};
use crate::amortization::{build_schedule, scenario_warnings, Schedule, Scenario};
use crate::indicators::{compute_indicators_with_warnings, IndicatorSet};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Months, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub scenario: Scenario,
    /// Annual discount rate for NPV and discounted payback. Defaults to
    /// the scenario's own rate.
    #[serde(default)]
    pub discount_rate_annual: Option<Rate>,
    #[serde(default)]
    pub rules: ClassificationRules,
}

impl AnalysisInput {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            discount_rate_annual: None,
            rules: ClassificationRules::default(),
        }
    }

    pub fn effective_discount_rate(&self) -> Rate {
        self.discount_rate_annual
            .unwrap_or(self.scenario.annual_rate)
    }
}

/// Actual schedule against the same loan with no prepayments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub baseline_total_interest: Money,
    pub actual_total_interest: Money,
    pub interest_saved: Money,
    pub baseline_total_paid: Money,
    pub actual_total_paid: Money,
    pub months_saved: Months,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub name: String,
    pub schedule: Schedule,
    pub indicators: IndicatorSet,
    pub classification: Classification,
    pub classification_guidance: String,
    pub prepayments: Vec<PrepaymentSummary>,
    pub baseline: BaselineComparison,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the full analysis for one scenario.
///
/// Only an invalid scenario fails; undefined indicators are reported as
/// warnings in the envelope.
pub fn analyze_scenario(
    input: &AnalysisInput,
) -> MortgageResult<ComputationOutput<ScenarioAnalysis>> {
    let start = Instant::now();
    let scenario = &input.scenario;

    let schedule = build_schedule(scenario)?;
    let mut warnings = scenario_warnings(scenario);

    let discount_rate = input.effective_discount_rate();
    let (indicators, indicator_warnings) = compute_indicators_with_warnings(&schedule, discount_rate);
    warnings.extend(indicator_warnings);

    let classification = classify(&indicators, &input.rules);
    let prepayments = summarize_prepayments(scenario, &schedule);
    let baseline = compare_with_baseline(scenario, &schedule)?;

    info!(
        name = %scenario.name,
        classification = %classification,
        payoff_month = ?schedule.payoff_month,
        "scenario analyzed"
    );

    let output = ScenarioAnalysis {
        name: scenario.name.clone(),
        classification_guidance: classification.guidance().to_string(),
        schedule,
        indicators,
        classification,
        prepayments,
        baseline,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French-system amortization with IRR/NPV/payback appraisal",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Compare an already-built schedule against the scenario without
/// prepayments.
pub fn compare_with_baseline(
    scenario: &Scenario,
    actual: &Schedule,
) -> MortgageResult<BaselineComparison> {
    let baseline = build_schedule(&scenario.without_contributions())?;
    let baseline_total_paid = baseline.total_paid();
    let actual_total_paid = actual.total_paid();

    Ok(BaselineComparison {
        baseline_total_interest: baseline.total_interest,
        actual_total_interest: actual.total_interest,
        interest_saved: round_money(baseline.total_interest - actual.total_interest),
        baseline_total_paid,
        actual_total_paid,
        months_saved: actual.months_saved.saturating_sub(baseline.months_saved),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{InsuranceCharge, Prepayment, PrepaymentMode};
    use crate::error::MortgageError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn scenario() -> Scenario {
        Scenario {
            name: "Reference".into(),
            principal: dec!(100000000),
            annual_rate: dec!(0.12),
            term_months: 12,
            insurance: InsuranceCharge::Total(Decimal::ZERO),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            contributions: vec![Prepayment {
                month: 6,
                amount: dec!(20000000),
                mode: PrepaymentMode::Term,
            }],
        }
    }

    #[test]
    fn test_analysis_bundles_every_part() {
        let out = analyze_scenario(&AnalysisInput::new(scenario())).unwrap();
        let analysis = &out.result;

        assert_eq!(analysis.name, "Reference");
        assert_eq!(analysis.schedule.payoff_month, Some(10));
        assert_eq!(analysis.prepayments.len(), 1);
        assert_eq!(analysis.indicators.discount_rate_annual, dec!(0.12));
        assert!(!analysis.classification_guidance.is_empty());
        assert!(out.methodology.contains("IRR"));
    }

    #[test]
    fn test_baseline_reports_savings() {
        let out = analyze_scenario(&AnalysisInput::new(scenario())).unwrap();
        let baseline = &out.result.baseline;

        assert_eq!(baseline.months_saved, 2);
        assert!(baseline.interest_saved > Decimal::ZERO);
        assert!(baseline.actual_total_interest < baseline.baseline_total_interest);
    }

    #[test]
    fn test_baseline_without_prepayments_saves_nothing() {
        let s = scenario().without_contributions();
        let schedule = build_schedule(&s).unwrap();
        let baseline = compare_with_baseline(&s, &schedule).unwrap();
        assert_eq!(baseline.interest_saved, Decimal::ZERO);
        assert_eq!(baseline.months_saved, 0);
        assert_eq!(baseline.actual_total_paid, baseline.baseline_total_paid);
    }

    #[test]
    fn test_explicit_discount_rate_overrides_scenario_rate() {
        let input = AnalysisInput {
            discount_rate_annual: Some(dec!(0.30)),
            ..AnalysisInput::new(scenario().without_contributions())
        };
        let out = analyze_scenario(&input).unwrap();
        assert_eq!(out.result.indicators.discount_rate_annual, dec!(0.30));
        assert!(out.result.indicators.npv.unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_scenario_warnings_surface_in_envelope() {
        let mut s = scenario();
        s.contributions.push(Prepayment {
            month: 6,
            amount: dec!(1000000),
            mode: PrepaymentMode::Payment,
        });
        let out = analyze_scenario(&AnalysisInput::new(s)).unwrap();
        assert!(out.warnings.iter().any(|w| w.starts_with("Month 6")));
        // Borrower series never turns non-negative after the disbursement
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("Payback not reached")));
    }

    #[test]
    fn test_invalid_scenario_fails() {
        let mut s = scenario();
        s.term_months = 0;
        let err = analyze_scenario(&AnalysisInput::new(s)).unwrap_err();
        assert!(matches!(err, MortgageError::InvalidScenario { .. }));
    }
}
