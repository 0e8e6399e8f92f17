//! Investment-appraisal indicators over the borrower cash-flow series
//! implied by an amortization schedule.
//!
//! Each indicator is resolved independently. A solver failure or a payback
//! that is never reached leaves that one field undefined (`None`) and is
//! reported as a warning; it never aborts the others.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::payback::{discounted_payback, simple_payback};
use crate::amortization::Schedule;
use crate::time_value::{irr, monthly_to_effective_annual, npv};
use crate::types::{round_money, round_rate, unsigned_zero, Money, Months, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Appraisal indicators for one schedule. `None` means undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// Periodic (monthly) IRR of the borrower cash flows.
    pub irr_monthly: Option<Rate>,
    /// IRR compounded to an effective annual rate.
    pub irr_annual: Option<Rate>,
    /// Total effective cost of the credit (same computation as the IRR).
    pub cet_annual: Option<Rate>,
    /// NPV at `discount_rate_annual / 12` per month.
    pub npv: Option<Money>,
    pub payback_months: Option<Months>,
    pub discounted_payback_months: Option<Months>,
    pub discount_rate_annual: Rate,
}

/// Compute IRR, NPV, payback and discounted payback for a schedule.
pub fn compute_indicators(schedule: &Schedule, discount_rate_annual: Rate) -> IndicatorSet {
    compute_indicators_with_warnings(schedule, discount_rate_annual).0
}

/// As [`compute_indicators`], also returning why any indicator is undefined.
pub fn compute_indicators_with_warnings(
    schedule: &Schedule,
    discount_rate_annual: Rate,
) -> (IndicatorSet, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let flows = schedule.cash_flows();
    let monthly_discount = discount_rate_annual / MONTHS_PER_YEAR;

    let irr_monthly = match irr(&flows, schedule.monthly_rate) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!(error = %e, "IRR undefined");
            warnings.push(format!("IRR undefined: {e}"));
            None
        }
    };

    let irr_annual = match irr_monthly.map(monthly_to_effective_annual) {
        Some(Ok(r)) => Some(round_rate(r)),
        Some(Err(e)) => {
            warnings.push(format!("IRR annualization failed: {e}"));
            None
        }
        None => None,
    };

    let npv_value = if flows.is_empty() {
        warnings.push("NPV undefined: schedule has no periods".into());
        None
    } else {
        match npv(monthly_discount, &flows) {
            Ok(v) => Some(round_money(v)),
            Err(e) => {
                warn!(error = %e, "NPV undefined");
                warnings.push(format!("NPV undefined: {e}"));
                None
            }
        }
    };

    let payback_months = simple_payback(&flows);
    if payback_months.is_none() {
        warnings.push("Payback not reached within the term".into());
    }

    let discounted_payback_months = discounted_payback(&flows, monthly_discount);
    if discounted_payback_months.is_none() {
        warnings.push("Discounted payback not reached within the term".into());
    }

    let set = IndicatorSet {
        irr_monthly: irr_monthly.map(|r| unsigned_zero(r.round_dp(8))),
        irr_annual,
        cet_annual: irr_annual,
        npv: npv_value,
        payback_months,
        discounted_payback_months,
        discount_rate_annual,
    };

    (set, warnings)
}
