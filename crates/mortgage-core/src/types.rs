use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Period counts on the monthly schedule grid
pub type Months = u32;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Round a monetary amount to cents.
pub fn round_money(value: Money) -> Money {
    unsigned_zero(value.round_dp(2))
}

/// Round a decimal rate to four places (two places as a percentage).
pub fn round_rate(value: Rate) -> Rate {
    unsigned_zero(value.round_dp(4))
}

/// Tiny negative values round to `-0`; report them as plain zero.
pub(crate) fn unsigned_zero(value: Decimal) -> Decimal {
    if value.is_zero() {
        Decimal::ZERO
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rounding() {
        assert_eq!(round_money(dec!(8856206.7366)), dec!(8856206.74));
        assert_eq!(round_rate(dec!(0.126825)), dec!(0.1268));
    }

    #[test]
    fn test_negative_dust_rounds_to_plain_zero() {
        let r = round_rate(dec!(-0.00000000071));
        assert!(!r.is_sign_negative());
        assert_eq!(r.to_string(), "0");
        assert_eq!(round_money(-Decimal::ZERO).to_string(), "0");
    }
}
