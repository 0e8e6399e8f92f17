use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSet;
use crate::types::Months;

/// Default payback ceiling (months) for a favorable verdict.
pub const DEFAULT_PAYBACK_THRESHOLD_MONTHS: Months = 60;

/// Business verdict on a scenario's indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Positive NPV, non-negative IRR and a short payback.
    Favorable,
    /// Mixed indicators; needs qualitative review.
    Intermediate,
    /// Non-positive NPV with a non-negative IRR.
    Unfavorable,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Favorable => "Favorable",
            Classification::Intermediate => "Intermediate",
            Classification::Unfavorable => "Unfavorable",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Classification::Favorable => {
                "Positive NPV, IRR above the cost of capital, short payback period."
            }
            Classification::Intermediate => {
                "Mixed: one or two acceptable indicators with reservations. Requires qualitative review."
            }
            Classification::Unfavorable => {
                "Negative NPV and/or low IRR, very long payback period."
            }
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Thresholds for [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    pub payback_threshold_months: Months,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            payback_threshold_months: DEFAULT_PAYBACK_THRESHOLD_MONTHS,
        }
    }
}

/// First matching rule wins: favorable, then unfavorable, else
/// intermediate. A rule that needs an undefined indicator does not match.
pub fn classify(indicators: &IndicatorSet, rules: &ClassificationRules) -> Classification {
    let favorable = match (indicators.npv, indicators.irr_annual, indicators.payback_months) {
        (Some(npv), Some(irr), Some(payback)) => {
            npv > Decimal::ZERO
                && irr >= Decimal::ZERO
                && payback <= rules.payback_threshold_months
        }
        _ => false,
    };
    if favorable {
        return Classification::Favorable;
    }

    let unfavorable = match (indicators.npv, indicators.irr_annual) {
        (Some(npv), Some(irr)) => npv <= Decimal::ZERO && irr >= Decimal::ZERO,
        _ => false,
    };
    if unfavorable {
        return Classification::Unfavorable;
    }

    Classification::Intermediate
}
