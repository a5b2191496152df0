use napi::Result as NapiResult;
use napi_derive::napi;

use mortgage_scenarios_core::amortization::{milestones, schedule};
use mortgage_scenarios_core::scenarios::{enumerator, inputs};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn search_scenarios(input_json: String) -> NapiResult<String> {
    let input: enumerator::ScenarioSearchInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = enumerator::search_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Form values in whole percent, returned as decimal-rate parameters ready
/// for `searchScenarios`.
#[napi]
pub fn normalize_inputs(input_json: String) -> NapiResult<String> {
    let form: inputs::PercentageInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let params = form.normalize();
    inputs::validate_params(&params).map_err(to_napi_error)?;
    serde_json::to_string(&params).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let input: schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_details(input_json: String) -> NapiResult<String> {
    let input: milestones::LoanDetailsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = milestones::loan_details(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
