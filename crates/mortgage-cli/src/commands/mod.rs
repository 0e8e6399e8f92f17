pub mod analyze;
pub mod batch;
pub mod indicators;
pub mod scenario;
pub mod schedule;

use mortgage_core::amortization::Scenario;
use mortgage_core::reporting::{AnalysisInput, ClassificationRules};
use rust_decimal::Decimal;

use crate::config::MortgageConfig;

/// Analysis settings with flags taking precedence over the config file.
pub fn analysis_input(
    scenario: Scenario,
    discount_rate: Option<Decimal>,
    payback_threshold: Option<u32>,
    config: &MortgageConfig,
) -> AnalysisInput {
    AnalysisInput {
        scenario,
        discount_rate_annual: discount_rate.or(config.analysis.discount_rate_annual),
        rules: ClassificationRules {
            payback_threshold_months: payback_threshold
                .unwrap_or(config.analysis.payback_threshold_months),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn scenario() -> Scenario {
        Scenario {
            name: "A".into(),
            principal: dec!(1000000),
            annual_rate: dec!(0.1),
            term_months: 12,
            insurance: Default::default(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            contributions: vec![],
        }
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = MortgageConfig::default();
        config.analysis.discount_rate_annual = Some(dec!(0.08));
        config.analysis.payback_threshold_months = 48;

        let input = analysis_input(scenario(), Some(dec!(0.15)), None, &config);
        assert_eq!(input.discount_rate_annual, Some(dec!(0.15)));
        assert_eq!(input.rules.payback_threshold_months, 48);

        let input = analysis_input(scenario(), None, Some(24), &config);
        assert_eq!(input.discount_rate_annual, Some(dec!(0.08)));
        assert_eq!(input.rules.payback_threshold_months, 24);
    }

    #[test]
    fn test_scenario_rate_when_nothing_configured() {
        let input = analysis_input(scenario(), None, None, &MortgageConfig::default());
        assert_eq!(input.effective_discount_rate(), dec!(0.1));
    }
}
