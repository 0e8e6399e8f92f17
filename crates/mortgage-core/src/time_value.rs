use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const RATE_STEP_TOLERANCE: Decimal = dec!(0.000000000000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 200;
const ROOT_ITERATIONS: u32 = 60;

/// Periodic IRR search bracket. Monthly rates outside it are not mortgage
/// economics and would overflow the discount factors on long terms.
const IRR_RATE_FLOOR: Rate = dec!(-0.05);
const IRR_RATE_CAP: Rate = dec!(0.5);

/// Net Present Value of a periodic series; `cash_flows[0]` is undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> MortgageResult<Money> {
    if rate <= dec!(-1) {
        return Err(MortgageError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    discounted_sums(rate, cash_flows)
        .map(|(value, _)| value)
        .ok_or_else(|| MortgageError::InvalidInput {
            field: "rate".into(),
            reason: format!("NPV discount factors overflow at rate {rate}"),
        })
}

/// Internal Rate of Return per period.
///
/// Newton-Raphson from `guess`, falling back to bisection over a fixed
/// bracket when the derivative vanishes, a step overflows or the iteration
/// cap is hit. Both loops are bounded.
pub fn irr(cash_flows: &[Money], guess: Rate) -> MortgageResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(MortgageError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !has_positive || !has_negative {
        return Err(MortgageError::InsufficientData(
            "IRR requires at least one sign change in the cash flows".into(),
        ));
    }

    let mut rate = guess.clamp(IRR_RATE_FLOOR, IRR_RATE_CAP);

    for i in 0..MAX_IRR_ITERATIONS {
        let Some((npv_val, dnpv)) = discounted_sums(rate, cash_flows) else {
            debug!(iteration = i, %rate, "IRR Newton step overflowed; falling back to bisection");
            break;
        };

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            debug!(iteration = i, %rate, "IRR derivative vanished; falling back to bisection");
            break;
        }

        let next = (rate - npv_val / dnpv).clamp(IRR_RATE_FLOOR, IRR_RATE_CAP);
        if (next - rate).abs() < RATE_STEP_TOLERANCE {
            return Ok(next);
        }
        rate = next;
    }

    irr_bisection(cash_flows)
}

fn irr_bisection(cash_flows: &[Money]) -> MortgageResult<Rate> {
    let mut lo = IRR_RATE_FLOOR;
    let mut hi = IRR_RATE_CAP;

    let no_bracket = |delta: Decimal| MortgageError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: 0,
        last_delta: delta,
    };

    let f_lo = discounted_sums(lo, cash_flows)
        .map(|(v, _)| v)
        .ok_or_else(|| no_bracket(Decimal::MAX))?;
    let f_hi = discounted_sums(hi, cash_flows)
        .map(|(v, _)| v)
        .ok_or_else(|| no_bracket(Decimal::MAX))?;

    if f_lo.is_zero() {
        return Ok(lo);
    }
    if f_hi.is_zero() {
        return Ok(hi);
    }
    if f_lo.is_sign_negative() == f_hi.is_sign_negative() {
        return Err(no_bracket(f_lo));
    }

    let mut f_lo_negative = f_lo.is_sign_negative();
    let mut last = f_lo;

    for i in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = discounted_sums(mid, cash_flows)
            .map(|(v, _)| v)
            .ok_or_else(|| MortgageError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: last,
            })?;

        if f_mid.abs() < CONVERGENCE_THRESHOLD || (hi - lo) < RATE_STEP_TOLERANCE {
            return Ok(mid);
        }

        if f_mid.is_sign_negative() == f_lo_negative {
            lo = mid;
            f_lo_negative = f_mid.is_sign_negative();
        } else {
            hi = mid;
        }
        last = f_mid;
    }

    Err(MortgageError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_BISECTION_ITERATIONS,
        last_delta: last,
    })
}

/// NPV and its derivative with respect to the rate. `None` on overflow.
fn discounted_sums(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    let v = Decimal::ONE.checked_div(one_plus_r)?;

    let mut value = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;
    let mut factor = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            factor = factor.checked_mul(v)?;
        }
        let pv = cf.checked_mul(factor)?;
        value = value.checked_add(pv)?;
        if t > 0 {
            let dt = Decimal::from(t as i64).checked_mul(pv)?.checked_mul(v)?;
            derivative = derivative.checked_sub(dt)?;
        }
    }

    Some((value, derivative))
}

/// `(1 + rate)^periods` by repeated multiplication.
pub fn compound_factor(rate: Rate, periods: u32) -> MortgageResult<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor
            .checked_mul(one_plus_r)
            .ok_or_else(|| MortgageError::InvalidInput {
                field: "rate".into(),
                reason: format!("compound factor overflow at rate {rate} over {periods} periods"),
            })?;
    }
    Ok(factor)
}

/// Level payment that amortizes `principal` over `periods` at `rate` per
/// period: `principal·r / (1 - (1+r)^-n)`. A zero rate degenerates to
/// straight-line `principal / periods`.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> MortgageResult<Money> {
    if periods == 0 {
        return Err(MortgageError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = compound_factor(rate, periods)?;
    let discount = Decimal::ONE
        .checked_div(factor)
        .ok_or_else(|| MortgageError::DivisionByZero {
            context: "annuity factor".into(),
        })?;
    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| MortgageError::InvalidInput {
            field: "principal".into(),
            reason: format!("annuity payment overflow at rate {rate} over {periods} periods"),
        })
}

/// Geometric monthly equivalent of an effective annual rate:
/// `(1 + ea)^(1/12) - 1`.
pub fn effective_annual_to_monthly(annual: Rate) -> MortgageResult<Rate> {
    if annual <= dec!(-1) {
        return Err(MortgageError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Effective annual rate must be greater than -100%".into(),
        });
    }
    if annual.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Ok(nth_root(Decimal::ONE + annual, 12) - Decimal::ONE)
}

/// Effective annual rate compounding a periodic monthly rate.
pub fn monthly_to_effective_annual(monthly: Rate) -> MortgageResult<Rate> {
    Ok(compound_factor(monthly, 12)? - Decimal::ONE)
}

/// Newton's method n-th root for a positive value.
fn nth_root(value: Decimal, n: u32) -> Decimal {
    let n_dec = Decimal::from(n);
    let mut x = Decimal::ONE + (value - Decimal::ONE) / n_dec;

    for _ in 0..ROOT_ITERATIONS {
        let mut x_pow = Decimal::ONE;
        for _ in 0..(n - 1) {
            x_pow *= x;
        }
        if x_pow.is_zero() {
            break;
        }
        let next = ((n_dec - Decimal::ONE) * x + value / x_pow) / n_dec;
        if (next - x).abs() < dec!(0.0000000000000000000001) {
            return next;
        }
        x = next;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(0.01));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_below_minus_one() {
        assert!(npv(dec!(-1), &[dec!(1), dec!(-1)]).is_err());
    }

    #[test]
    fn test_irr_basic() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let result = irr(&cfs, dec!(0.10)).unwrap();
        // IRR should be ~9.7%
        assert!((result - dec!(0.0970)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_irr_loan_perspective() {
        // Borrower receives 1000 and repays 12 x 88.85 => ~1% per month
        let mut cfs = vec![dec!(1000)];
        cfs.extend(std::iter::repeat(dec!(-88.848789)).take(12));
        let result = irr(&cfs, dec!(0.01)).unwrap();
        assert!((result - dec!(0.01)).abs() < dec!(0.00001));
    }

    #[test]
    fn test_irr_zero_when_repayment_equals_disbursement() {
        let mut cfs = vec![dec!(1200)];
        cfs.extend(std::iter::repeat(dec!(-100)).take(12));
        let result = irr(&cfs, dec!(0.01)).unwrap();
        assert!(result.abs() < dec!(0.0000001));
    }

    #[test]
    fn test_irr_requires_sign_change() {
        let cfs = vec![dec!(-100), dec!(-50), dec!(-50)];
        assert!(matches!(
            irr(&cfs, dec!(0.01)),
            Err(MortgageError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_irr_single_flow_is_insufficient() {
        assert!(irr(&[dec!(100)], dec!(0.01)).is_err());
    }

    #[test]
    fn test_irr_bisection_matches_newton() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let newton = irr(&cfs, dec!(0.10)).unwrap();
        let bisection = irr_bisection(&cfs).unwrap();
        assert!((newton - bisection).abs() < dec!(0.000001));
    }

    #[test]
    fn test_monthly_rate_is_geometric() {
        let monthly = effective_annual_to_monthly(dec!(0.12)).unwrap();
        // (1.12)^(1/12) - 1 = 0.0094887929345830...
        assert!((monthly - dec!(0.009488792934583)).abs() < dec!(0.000000000001));
        // Never the nominal 0.01
        assert!(monthly < dec!(0.01));
    }

    #[test]
    fn test_monthly_rate_round_trips_to_annual() {
        let monthly = effective_annual_to_monthly(dec!(0.1095)).unwrap();
        let annual = monthly_to_effective_annual(monthly).unwrap();
        assert!((annual - dec!(0.1095)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_zero_annual_rate_gives_zero_monthly() {
        assert_eq!(effective_annual_to_monthly(dec!(0)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_annuity_payment_known_answer() {
        let monthly = effective_annual_to_monthly(dec!(0.12)).unwrap();
        let payment = annuity_payment(dec!(100000000), monthly, 12).unwrap();
        assert!((payment - dec!(8856206.74)).abs() < dec!(0.01));
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        let payment = annuity_payment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(payment, dec!(100));
    }

    #[test]
    fn test_annuity_payment_zero_periods() {
        assert!(annuity_payment(dec!(1200), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_annuity_payment_high_rate_long_term() {
        // 500% EA over 30 years: the compound factor is ~1e23, so the
        // installment is essentially the interest on the principal
        let monthly = effective_annual_to_monthly(dec!(5)).unwrap();
        let payment = annuity_payment(dec!(100000000), monthly, 360).unwrap();
        let interest_only = dec!(100000000) * monthly;
        assert!(payment > interest_only);
        assert!(payment - interest_only < dec!(0.01));
    }

    #[test]
    fn test_compound_factor_overflow_is_invalid_input() {
        let err = compound_factor(dec!(1), 200).unwrap_err();
        match err {
            MortgageError::InvalidInput { field, reason } => {
                assert_eq!(field, "rate");
                assert!(reason.contains("overflow"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
