use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amortization::{PrepaymentMode, Schedule, Scenario};
use crate::types::{Money, Months};

/// Key facts about one prepayment event, as printed on a per-event summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentSummary {
    pub scenario: String,
    pub month: Months,
    pub date: Option<NaiveDate>,
    pub amount: Money,
    pub mode: PrepaymentMode,
    /// Installment in force after the event (payment mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_payment: Option<Money>,
    pub effect: String,
    /// Balance right after the month closed.
    pub balance_after: Option<Money>,
}

/// One summary per prepayment, in schedule order.
pub fn summarize_prepayments(scenario: &Scenario, schedule: &Schedule) -> Vec<PrepaymentSummary> {
    let mut summaries = Vec::with_capacity(scenario.contributions.len());

    for (month, events) in scenario.contributions_by_month() {
        let row = schedule.rows.iter().find(|r| r.month == month);
        for event in events {
            let new_payment = match event.mode {
                PrepaymentMode::Payment => row.and_then(|r| r.recomputed_payment),
                PrepaymentMode::Term => None,
            };
            summaries.push(PrepaymentSummary {
                scenario: scenario.name.clone(),
                month,
                date: row.map(|r| r.date),
                amount: event.amount,
                mode: event.mode,
                new_payment,
                effect: event.mode.effect().to_string(),
                balance_after: row.map(|r| r.balance),
            });
        }
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{build_schedule, InsuranceCharge, Prepayment};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_one_summary_per_event() {
        let scenario = Scenario {
            name: "Apto 301".into(),
            principal: dec!(200000000),
            annual_rate: dec!(0.1095),
            term_months: 240,
            insurance: InsuranceCharge::Total(dec!(6000000)),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            contributions: vec![
                Prepayment {
                    month: 24,
                    amount: dec!(10000000),
                    mode: PrepaymentMode::Payment,
                },
                Prepayment {
                    month: 12,
                    amount: dec!(5000000),
                    mode: PrepaymentMode::Term,
                },
            ],
        };
        let schedule = build_schedule(&scenario).unwrap();
        let summaries = summarize_prepayments(&scenario, &schedule);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].month, 12);
        assert_eq!(summaries[0].effect, "term reduction");
        assert_eq!(summaries[0].new_payment, None);
        assert_eq!(summaries[0].date, NaiveDate::from_ymd_opt(2026, 2, 1));

        assert_eq!(summaries[1].month, 24);
        assert_eq!(summaries[1].effect, "payment reduction");
        let new_payment = summaries[1].new_payment.unwrap();
        assert!(new_payment > Decimal::ZERO);
        assert!(new_payment < schedule.initial_payment);
        assert_eq!(summaries[1].scenario, "Apto 301");
    }
}
