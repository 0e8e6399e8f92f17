use rust_decimal::Decimal;

use crate::types::{Money, Months, Rate};

/// First month whose running sum of `flows[1..]` is non-negative. The
/// month-0 disbursement is kept out of the accumulator.
pub fn simple_payback(flows: &[Money]) -> Option<Months> {
    let mut cumulative = Decimal::ZERO;
    for (i, cf) in flows.iter().enumerate().skip(1) {
        cumulative += cf;
        if cumulative >= Decimal::ZERO {
            return Some(i as Months);
        }
    }
    None
}

/// First month at which `flows[0]` plus the discounted `flows[1..m]` is
/// non-negative. `None` if never reached or the rate is not above -100%.
pub fn discounted_payback(flows: &[Money], monthly_rate: Rate) -> Option<Months> {
    let first = *flows.first()?;
    let one_plus_r = Decimal::ONE.checked_add(monthly_rate)?;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut cumulative = first;
    let mut factor = Decimal::ONE;
    for (i, cf) in flows.iter().enumerate().skip(1) {
        factor = factor.checked_mul(one_plus_r)?;
        cumulative += cf.checked_div(factor)?;
        if cumulative >= Decimal::ZERO {
            return Some(i as Months);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_simple_payback_never_reached_on_pure_outflows() {
        let flows = vec![dec!(1000), dec!(-100), dec!(-100), dec!(-100)];
        assert_eq!(simple_payback(&flows), None);
    }

    #[test]
    fn test_simple_payback_first_non_negative_month() {
        let flows = vec![dec!(-1000), dec!(-50), dec!(30), dec!(40)];
        assert_eq!(simple_payback(&flows), Some(3));
    }

    #[test]
    fn test_simple_payback_zero_flow_counts() {
        let flows = vec![dec!(1000), dec!(0), dec!(-100)];
        assert_eq!(simple_payback(&flows), Some(1));
    }

    #[test]
    fn test_discounted_payback_starts_from_disbursement() {
        // 1000 received, 12 x 100 repaid at 1%/month: cumulative stays
        // positive until the discounted repayments exceed 1000.
        let mut flows = vec![dec!(1000)];
        flows.extend(std::iter::repeat(dec!(-100)).take(12));
        assert_eq!(discounted_payback(&flows, dec!(0.01)), Some(1));
    }

    #[test]
    fn test_discounted_payback_for_investment() {
        // Invest 1000, receive 400/yr at 10%: recovered in year 4
        let flows = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        assert_eq!(discounted_payback(&flows, dec!(0.10)), None);
        let flows = vec![dec!(-1000), dec!(400), dec!(400), dec!(400), dec!(400)];
        assert_eq!(discounted_payback(&flows, dec!(0.10)), Some(4));
    }

    #[test]
    fn test_discounted_payback_rejects_rate_at_minus_one() {
        let flows = vec![dec!(-1000), dec!(2000)];
        assert_eq!(discounted_payback(&flows, dec!(-1)), None);
    }

    #[test]
    fn test_empty_flows() {
        assert_eq!(simple_payback(&[]), None);
        assert_eq!(discounted_payback(&[], dec!(0.01)), None);
    }
}
