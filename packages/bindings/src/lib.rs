use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use feecalc_core::validation::ValidationIssue;
use feecalc_core::{CalculationResult, Offer, Scenario};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn to_json(value: &impl Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// `{ scenario, offer }` → evaluation envelope.
#[napi]
pub fn evaluate_offer(input_json: String) -> NapiResult<String> {
    let input: feecalc_core::analysis::EvaluateInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    to_json(&feecalc_core::analysis::evaluate(&input))
}

/// `{ scenario, offers, steps? }` → sensitivity points envelope.
#[napi]
pub fn compute_sensitivity(input_json: String) -> NapiResult<String> {
    let input: feecalc_core::analysis::SweepInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = feecalc_core::analysis::sweep(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn solve_irr(input_json: String) -> NapiResult<String> {
    let input: feecalc_core::analysis::IrrInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = feecalc_core::analysis::solve_irr(&input).map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[napi]
pub fn validate_scenario(scenario_json: String) -> NapiResult<String> {
    let scenario: Scenario = serde_json::from_str(&scenario_json).map_err(to_napi_error)?;
    let issues: Vec<ValidationIssue> = feecalc_core::validation::validate_scenario(&scenario);
    to_json(&issues)
}

#[napi]
pub fn validate_offer(offer_json: String) -> NapiResult<String> {
    let offer: Offer = serde_json::from_str(&offer_json).map_err(to_napi_error)?;
    to_json(&feecalc_core::validation::validate_offer(&offer))
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Array of evaluation results → comparison table.
#[napi]
pub fn compare_results(results_json: String) -> NapiResult<String> {
    let results: Vec<CalculationResult> =
        serde_json::from_str(&results_json).map_err(to_napi_error)?;
    to_json(&feecalc_core::comparison::compare_results(&results))
}

#[napi]
pub fn analyze(input_json: String) -> NapiResult<String> {
    let input: feecalc_core::analysis::AnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = feecalc_core::analysis::analyze(&input).map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Session and input helpers
// ---------------------------------------------------------------------------

/// Any persisted session document (current or legacy) → current-version
/// session file.
#[napi]
pub fn load_session(document: String) -> NapiResult<String> {
    let session = feecalc_core::session::load_session(&document).map_err(to_napi_error)?;
    to_json(&session.to_file())
}

/// Free-form amount text ("1.5m", "25,000") → decimal string, or null.
#[napi]
pub fn parse_amount(text: String) -> Option<String> {
    feecalc_core::parse::parse_amount(&text).map(|v| v.to_string())
}
