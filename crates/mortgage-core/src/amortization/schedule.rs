//! Month-by-month amortization with mid-schedule prepayments.
//!
//! The engine walks the term once, appending an immutable [`ScheduleRow`]
//! per period. Full precision is carried between periods; rows report
//! amounts rounded to cents.

use chrono::{Months as CalendarMonths, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scenario::{PrepaymentMode, Scenario};
use crate::error::MortgageError;
use crate::time_value::{annuity_payment, effective_annual_to_monthly};
use crate::types::{round_money, Money, Months, Rate};
use crate::MortgageResult;

/// Outstanding balance below which the loan is considered repaid.
const BALANCE_EPSILON: Decimal = dec!(0.005);

/// One period of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: Months,
    pub date: NaiveDate,
    /// Balance owed when the period opens.
    pub opening_balance: Money,
    /// Installment charged this period (zero once the loan is repaid).
    pub payment: Money,
    pub interest: Money,
    pub principal_paid: Money,
    /// Closing balance, floored at zero.
    pub balance: Money,
    pub insurance: Money,
    /// Borrower cash flow for the period (negative = outflow).
    pub net_cash_flow: Money,
    pub prepayment_applied: bool,
    /// Sum of all prepayments applied this period.
    pub prepayment_amount: Money,
    /// New installment in force from the next period, when a payment-mode
    /// prepayment recomputed it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recomputed_payment: Option<Money>,
}

/// A complete amortization schedule, one row per scheduled period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub rows: Vec<ScheduleRow>,
    /// Geometric monthly equivalent of the effective annual rate.
    pub monthly_rate: Rate,
    /// Level installment computed at origination.
    pub initial_payment: Money,
    /// First month whose closing balance is zero.
    pub payoff_month: Option<Months>,
    /// `term - payoff_month`: periods after the one that cleared the
    /// balance. Zero for a loan that runs its full term.
    pub months_saved: Months,
    pub total_interest: Money,
    pub total_payments: Money,
    pub total_prepayments: Money,
    pub total_insurance: Money,
}

impl Schedule {
    pub fn term_months(&self) -> Months {
        self.rows.len() as Months
    }

    /// Loan amount recovered from the schedule itself: the balance owed
    /// when period 1 opens.
    pub fn disbursement(&self) -> Option<Money> {
        self.rows.first().map(|r| r.opening_balance)
    }

    /// Borrower cash-flow series: `+disbursement` at month 0 followed by
    /// each period's net cash flow.
    pub fn cash_flows(&self) -> Vec<Money> {
        let mut flows = Vec::with_capacity(self.rows.len() + 1);
        if let Some(d) = self.disbursement() {
            flows.push(d);
        }
        flows.extend(self.rows.iter().map(|r| r.net_cash_flow));
        flows
    }

    /// Total borrower outflow over the schedule (installments, prepayments
    /// and insurance).
    pub fn total_paid(&self) -> Money {
        self.total_payments + self.total_prepayments + self.total_insurance
    }
}

/// Build the month-by-month amortization schedule for a scenario.
///
/// Fails with `InvalidScenario`, or `InvalidInput` when the rate and term
/// overflow the compound factor; no partial schedule is ever produced.
pub fn build_schedule(scenario: &Scenario) -> MortgageResult<Schedule> {
    scenario.validate()?;

    let term = scenario.term_months;
    let monthly_rate = effective_annual_to_monthly(scenario.annual_rate)?;
    let initial_payment = annuity_payment(scenario.principal, monthly_rate, term)?;
    let insurance = scenario.insurance.per_period(term);
    let grouped = scenario.contributions_by_month();

    debug!(
        name = %scenario.name,
        term,
        %monthly_rate,
        %initial_payment,
        prepayments = scenario.contributions.len(),
        "building amortization schedule"
    );

    let mut rows: Vec<ScheduleRow> = Vec::with_capacity(term as usize);
    let mut balance = scenario.principal;
    let mut payment = initial_payment;
    let mut payoff_month: Option<Months> = None;

    let mut total_interest = Decimal::ZERO;
    let mut total_payments = Decimal::ZERO;
    let mut total_prepayments = Decimal::ZERO;

    for month in 1..=term {
        let date = period_date(scenario.start_date, month)?;

        if balance.is_zero() {
            rows.push(ScheduleRow {
                month,
                date,
                opening_balance: Decimal::ZERO,
                payment: Decimal::ZERO,
                interest: Decimal::ZERO,
                principal_paid: Decimal::ZERO,
                balance: Decimal::ZERO,
                insurance: round_money(insurance),
                net_cash_flow: round_money(-insurance),
                prepayment_applied: false,
                prepayment_amount: Decimal::ZERO,
                recomputed_payment: None,
            });
            continue;
        }

        let opening = balance;
        let installment = payment;
        let interest = opening * monthly_rate;
        let principal_paid = installment - interest;

        let events = grouped.get(&month).map(Vec::as_slice).unwrap_or(&[]);
        let mut prepaid = Decimal::ZERO;
        for event in events {
            balance = (balance - event.amount).max(Decimal::ZERO);
            prepaid += event.amount;
        }

        // Re-amortize the post-prepayment balance over the periods still
        // left; the new installment is charged from next month.
        let mut recomputed: Option<Money> = None;
        let remaining = term - month;
        if remaining > 0 && events.iter().any(|e| e.mode == PrepaymentMode::Payment) {
            payment = annuity_payment(balance, monthly_rate, remaining)?;
            recomputed = Some(payment);
        }

        balance = (balance - principal_paid).max(Decimal::ZERO);
        if balance < BALANCE_EPSILON {
            balance = Decimal::ZERO;
        }

        if balance.is_zero() && payoff_month.is_none() {
            payoff_month = Some(month);
            debug!(month, "loan repaid");
        }

        let net_cash_flow = -(installment + insurance + prepaid);

        total_interest += interest;
        total_payments += installment;
        total_prepayments += prepaid;

        rows.push(ScheduleRow {
            month,
            date,
            opening_balance: round_money(opening),
            payment: round_money(installment),
            interest: round_money(interest),
            principal_paid: round_money(principal_paid),
            balance: round_money(balance),
            insurance: round_money(insurance),
            net_cash_flow: round_money(net_cash_flow),
            prepayment_applied: !events.is_empty(),
            prepayment_amount: round_money(prepaid),
            recomputed_payment: recomputed.map(round_money),
        });
    }

    let months_saved = payoff_month.map(|m| term - m).unwrap_or(0);

    Ok(Schedule {
        rows,
        monthly_rate,
        initial_payment: round_money(initial_payment),
        payoff_month,
        months_saved,
        total_interest: round_money(total_interest),
        total_payments: round_money(total_payments),
        total_prepayments: round_money(total_prepayments),
        total_insurance: round_money(insurance * Decimal::from(term)),
    })
}

/// Calendar date of a 1-based period, `start` being period 1.
fn period_date(start: NaiveDate, month: Months) -> MortgageResult<NaiveDate> {
    start
        .checked_add_months(CalendarMonths::new(month - 1))
        .ok_or_else(|| {
            MortgageError::invalid(
                "start_date",
                format!("period {month} falls outside the supported calendar range"),
            )
        })
}
