pub mod analysis;
pub mod classification;
pub mod prepayment_summary;

pub use analysis::{analyze_scenario, AnalysisInput, BaselineComparison, ScenarioAnalysis};
pub use classification::{classify, Classification, ClassificationRules};
pub use prepayment_summary::{summarize_prepayments, PrepaymentSummary};
