use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use mortgage_core::amortization::{self, Scenario};
use mortgage_core::indicators;
use mortgage_core::reporting::{self, AnalysisInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct IndicatorsRequest {
    scenario: Scenario,
    #[serde(default)]
    discount_rate_annual: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

/// Scenario JSON in, schedule JSON out.
#[napi]
pub fn build_schedule(scenario_json: String) -> NapiResult<String> {
    let scenario: Scenario = serde_json::from_str(&scenario_json).map_err(to_napi_error)?;
    let schedule = amortization::build_schedule(&scenario).map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// `{ scenario, discount_rate_annual? }` in; the indicator set and the
/// reasons for any undefined indicator out.
#[napi]
pub fn compute_indicators(input_json: String) -> NapiResult<String> {
    let request: IndicatorsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule = amortization::build_schedule(&request.scenario).map_err(to_napi_error)?;
    let discount_rate = request
        .discount_rate_annual
        .unwrap_or(request.scenario.annual_rate);
    let (set, warnings) = indicators::compute_indicators_with_warnings(&schedule, discount_rate);
    serde_json::to_string(&serde_json::json!({
        "indicators": set,
        "warnings": warnings,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_scenario(input_json: String) -> NapiResult<String> {
    let input: AnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = reporting::analyze_scenario(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
