//! Loan scenario inputs: principal, effective annual rate, term, insurance
//! and the list of prepayment events ("aportes").

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MortgageError;
use crate::types::{Money, Months, Rate};
use crate::MortgageResult;

/// How a prepayment is absorbed by the loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentMode {
    /// Keep the installment, shorten the loan.
    #[default]
    #[serde(alias = "plazo")]
    Term,
    /// Keep the maturity, recompute a lower installment.
    #[serde(alias = "cuota")]
    Payment,
}

impl PrepaymentMode {
    /// Human-readable effect of the prepayment on the loan.
    pub fn effect(&self) -> &'static str {
        match self {
            PrepaymentMode::Term => "term reduction",
            PrepaymentMode::Payment => "payment reduction",
        }
    }
}

impl std::str::FromStr for PrepaymentMode {
    type Err = MortgageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "term" | "plazo" => Ok(PrepaymentMode::Term),
            "payment" | "cuota" => Ok(PrepaymentMode::Payment),
            other => Err(MortgageError::invalid(
                "mode",
                format!("Unknown prepayment mode '{other}' (expected term or payment)"),
            )),
        }
    }
}

impl std::fmt::Display for PrepaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrepaymentMode::Term => write!(f, "term"),
            PrepaymentMode::Payment => write!(f, "payment"),
        }
    }
}

/// An extraordinary principal reduction applied in a given month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prepayment {
    /// Period (1-based) in which the prepayment is applied.
    pub month: Months,
    /// Amount subtracted from the outstanding balance.
    pub amount: Money,
    #[serde(default)]
    pub mode: PrepaymentMode,
}

/// Credit life / property insurance charged with every installment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceCharge {
    /// Total premium over the life of the loan, spread evenly per period.
    Total(Money),
    /// Premium already divided per period.
    PerPeriod(Money),
}

impl Default for InsuranceCharge {
    fn default() -> Self {
        InsuranceCharge::Total(Decimal::ZERO)
    }
}

impl InsuranceCharge {
    /// Insurance charged each month for a loan of `term_months`.
    pub fn per_period(&self, term_months: Months) -> Money {
        match self {
            InsuranceCharge::Total(total) if term_months > 0 => {
                *total / Decimal::from(term_months)
            }
            InsuranceCharge::Total(_) => Decimal::ZERO,
            InsuranceCharge::PerPeriod(amount) => *amount,
        }
    }

    fn amount(&self) -> Money {
        match self {
            InsuranceCharge::Total(v) | InsuranceCharge::PerPeriod(v) => *v,
        }
    }
}

/// A fixed-rate, fixed-term loan with optional prepayments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Free-form label carried into reports.
    #[serde(default)]
    pub name: String,
    /// Amount disbursed at month 0.
    pub principal: Money,
    /// Effective annual rate (e.g. 0.1095 = 10.95% EA).
    pub annual_rate: Rate,
    /// Number of scheduled monthly periods.
    pub term_months: Months,
    #[serde(default)]
    pub insurance: InsuranceCharge,
    /// Calendar date of period 1.
    pub start_date: NaiveDate,
    /// Prepayment events, in any order.
    #[serde(default)]
    pub contributions: Vec<Prepayment>,
}

impl Scenario {
    /// Check the scenario contract. Any violation aborts schedule construction.
    pub fn validate(&self) -> MortgageResult<()> {
        if self.term_months == 0 {
            return Err(MortgageError::invalid(
                "term_months",
                "Term must be at least 1 month",
            ));
        }
        if self.principal <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "principal",
                "Loan amount must be positive",
            ));
        }
        if self.annual_rate <= Decimal::NEGATIVE_ONE {
            return Err(MortgageError::invalid(
                "annual_rate",
                "Effective annual rate must be greater than -100%",
            ));
        }
        if self.insurance.amount() < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "insurance",
                "Insurance cannot be negative",
            ));
        }
        for (i, p) in self.contributions.iter().enumerate() {
            if p.month == 0 || p.month > self.term_months {
                return Err(MortgageError::invalid(
                    &format!("contributions[{i}].month"),
                    format!(
                        "Prepayment month {} is outside 1..={}",
                        p.month, self.term_months
                    ),
                ));
            }
            if p.amount <= Decimal::ZERO {
                return Err(MortgageError::invalid(
                    &format!("contributions[{i}].amount"),
                    "Prepayment amount must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Non-fatal issues worth surfacing alongside the results.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let by_month = self.contributions_by_month();
        for (month, events) in &by_month {
            if events.len() > 1 && events.iter().any(|p| p.mode == PrepaymentMode::Payment) {
                warnings.push(format!(
                    "Month {month}: {} prepayments share the month with a payment recomputation; \
                     all are applied before the installment is recomputed once",
                    events.len()
                ));
            }
        }

        for p in &self.contributions {
            if p.amount > self.principal {
                warnings.push(format!(
                    "Prepayment of {} in month {} exceeds the loan amount {}",
                    p.amount, p.month, self.principal
                ));
            }
        }

        warnings
    }

    /// Prepayments grouped by month, months ascending, list order kept
    /// within a month.
    pub fn contributions_by_month(&self) -> BTreeMap<Months, Vec<&Prepayment>> {
        let mut grouped: BTreeMap<Months, Vec<&Prepayment>> = BTreeMap::new();
        for p in &self.contributions {
            grouped.entry(p.month).or_default().push(p);
        }
        grouped
    }

    /// The same loan without any prepayment.
    pub fn without_contributions(&self) -> Scenario {
        Scenario {
            contributions: Vec::new(),
            ..self.clone()
        }
    }
}

/// Non-fatal issues of a scenario, for callers holding only a reference.
pub fn scenario_warnings(scenario: &Scenario) -> Vec<String> {
    scenario.warnings()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base() -> Scenario {
        Scenario {
            name: "Base".into(),
            principal: dec!(100000000),
            annual_rate: dec!(0.12),
            term_months: 12,
            insurance: InsuranceCharge::Total(dec!(1200000)),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            contributions: vec![],
        }
    }

    #[test]
    fn test_valid_scenario() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_zero_term_rejected() {
        let s = Scenario {
            term_months: 0,
            ..base()
        };
        assert!(matches!(
            s.validate(),
            Err(MortgageError::InvalidScenario { .. })
        ));
    }

    #[test]
    fn test_prepayment_month_out_of_range() {
        for month in [0, 13] {
            let s = Scenario {
                contributions: vec![Prepayment {
                    month,
                    amount: dec!(1000),
                    mode: PrepaymentMode::Term,
                }],
                ..base()
            };
            assert!(s.validate().is_err(), "month {month} should be rejected");
        }
    }

    #[test]
    fn test_non_positive_prepayment_rejected() {
        let s = Scenario {
            contributions: vec![Prepayment {
                month: 3,
                amount: dec!(0),
                mode: PrepaymentMode::Term,
            }],
            ..base()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_insurance_spread_per_period() {
        assert_eq!(base().insurance.per_period(12), dec!(100000));
        assert_eq!(
            InsuranceCharge::PerPeriod(dec!(5000)).per_period(12),
            dec!(5000)
        );
    }

    #[test]
    fn test_duplicate_payment_month_warns() {
        let s = Scenario {
            contributions: vec![
                Prepayment {
                    month: 4,
                    amount: dec!(1000),
                    mode: PrepaymentMode::Payment,
                },
                Prepayment {
                    month: 4,
                    amount: dec!(2000),
                    mode: PrepaymentMode::Term,
                },
            ],
            ..base()
        };
        assert!(s.validate().is_ok());
        let warnings = s.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Month 4"));
    }

    #[test]
    fn test_duplicate_term_month_does_not_warn() {
        let s = Scenario {
            contributions: vec![
                Prepayment {
                    month: 4,
                    amount: dec!(1000),
                    mode: PrepaymentMode::Term,
                },
                Prepayment {
                    month: 4,
                    amount: dec!(2000),
                    mode: PrepaymentMode::Term,
                },
            ],
            ..base()
        };
        assert!(s.warnings().is_empty());
    }

    #[test]
    fn test_oversized_prepayment_warns() {
        let s = Scenario {
            contributions: vec![Prepayment {
                month: 2,
                amount: dec!(200000000),
                mode: PrepaymentMode::Term,
            }],
            ..base()
        };
        assert!(s.warnings()[0].contains("exceeds the loan amount"));
    }

    #[test]
    fn test_grouping_sorts_months_and_keeps_order() {
        let s = Scenario {
            contributions: vec![
                Prepayment {
                    month: 9,
                    amount: dec!(3),
                    mode: PrepaymentMode::Term,
                },
                Prepayment {
                    month: 2,
                    amount: dec!(1),
                    mode: PrepaymentMode::Term,
                },
                Prepayment {
                    month: 2,
                    amount: dec!(2),
                    mode: PrepaymentMode::Payment,
                },
            ],
            ..base()
        };
        let grouped = s.contributions_by_month();
        let months: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(months, vec![2, 9]);
        let amounts: Vec<_> = grouped[&2].iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![dec!(1), dec!(2)]);
    }

    #[test]
    fn test_mode_aliases_deserialize() {
        let p: Prepayment =
            serde_json::from_str(r#"{"month": 3, "amount": "1000", "mode": "cuota"}"#).unwrap();
        assert_eq!(p.mode, PrepaymentMode::Payment);
        let p: Prepayment = serde_json::from_str(r#"{"month": 3, "amount": "1000"}"#).unwrap();
        assert_eq!(p.mode, PrepaymentMode::Term);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Plazo".parse::<PrepaymentMode>().unwrap(), PrepaymentMode::Term);
        assert_eq!(" payment ".parse::<PrepaymentMode>().unwrap(), PrepaymentMode::Payment);
        assert!("fortnight".parse::<PrepaymentMode>().is_err());
    }
}
