pub mod appraisal;
pub mod payback;

pub use appraisal::{compute_indicators, compute_indicators_with_warnings, IndicatorSet};
