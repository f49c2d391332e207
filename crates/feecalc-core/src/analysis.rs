use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::comparison::{compare_results, ComparisonTable};
use crate::evaluator::{evaluate_offer, irr_cash_flows, CalculationResult};
use crate::offer::{check_offer_set, Offer};
use crate::scenario::Scenario;
use crate::sensitivity::{compute_sensitivity, SensitivityPoint, DEFAULT_SENSITIVITY_STEPS};
use crate::time_value::{self, npv};
use crate::types::*;
use crate::validation::{validate_offer, validate_scenario, ValidationIssue};
use crate::FeeCalcResult;

fn default_steps() -> u32 {
    DEFAULT_SENSITIVITY_STEPS
}

// ---------------------------------------------------------------------------
// Full analysis
// ---------------------------------------------------------------------------

/// A scenario, the offers to compare under it, and the sweep resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub scenario: Scenario,
    pub offers: Vec<Offer>,
    #[serde(default = "default_steps")]
    pub sensitivity_steps: u32,
}

/// Validation issues for one offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferIssues {
    pub offer_id: String,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub results: Vec<CalculationResult>,
    pub sensitivity: Vec<SensitivityPoint>,
    pub comparison: ComparisonTable,
    pub scenario_issues: Vec<ValidationIssue>,
    /// Only offers with at least one issue
    pub offer_issues: Vec<OfferIssues>,
}

/// Evaluate, sweep and compare every offer, validating alongside.
///
/// Structural problems (no offers, more than five, duplicate ids) are
/// errors. Field validation issues are reported in the output and echoed as
/// warnings; the numbers are computed regardless.
pub fn analyze(input: &AnalysisInput) -> FeeCalcResult<ComputationOutput<AnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    check_offer_set(&input.offers)?;

    let scenario_issues = validate_scenario(&input.scenario);
    for issue in &scenario_issues {
        warnings.push(format!("scenario.{}: {}", issue.field, issue.message));
    }

    let mut offer_issues = Vec::new();
    for offer in &input.offers {
        let issues = validate_offer(offer);
        if issues.is_empty() {
            continue;
        }
        for issue in &issues {
            warnings.push(format!("{}: {}: {}", offer.name, issue.field, issue.message));
        }
        offer_issues.push(OfferIssues {
            offer_id: offer.id.clone(),
            issues,
        });
    }

    let results: Vec<CalculationResult> = input
        .offers
        .iter()
        .map(|offer| evaluate_offer(&input.scenario, offer))
        .collect();
    for result in results.iter().filter(|r| r.net_irr.is_none()) {
        warnings.push(format!(
            "{}: net IRR is undetermined for these cash flows",
            result.offer_name
        ));
    }

    let sensitivity = compute_sensitivity(&input.scenario, &input.offers, input.sensitivity_steps);
    let comparison = compare_results(&results);

    let elapsed = start.elapsed().as_micros() as u64;
    debug!(
        offers = input.offers.len(),
        points = sensitivity.len(),
        warnings = warnings.len(),
        elapsed_us = elapsed,
        "analysis complete"
    );

    let output = AnalysisOutput {
        results,
        sensitivity,
        comparison,
        scenario_issues,
        offer_issues,
    };

    Ok(with_metadata(
        "Offer fee comparison: European waterfall carry, Newton/bisection IRR, bisection break-even",
        &serde_json::json!({
            "investment_amount": input.scenario.investment_amount.to_string(),
            "exit_price_per_share": input.scenario.exit_price().to_string(),
            "time_horizon": input.scenario.time_horizon,
            "offers": input.offers.len(),
            "sensitivity_steps": input.sensitivity_steps,
            "nav_estimate": "straight-line from investment to gross exit value",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Single-purpose wrappers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateInput {
    pub scenario: Scenario,
    pub offer: Offer,
}

/// One offer under one scenario, with validation issues as warnings.
pub fn evaluate(input: &EvaluateInput) -> ComputationOutput<CalculationResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = validate_scenario(&input.scenario)
        .into_iter()
        .chain(validate_offer(&input.offer))
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect();

    let result = evaluate_offer(&input.scenario, &input.offer);
    if result.net_irr.is_none() {
        warnings.push("net IRR is undetermined for these cash flows".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Single offer evaluation",
        &serde_json::json!({
            "offer_id": input.offer.id,
            "cash_flows": irr_cash_flows(&input.scenario, &input.offer)
                .iter()
                .map(|cf| cf.to_string())
                .collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        result,
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepInput {
    pub scenario: Scenario,
    pub offers: Vec<Offer>,
    #[serde(default = "default_steps")]
    pub steps: u32,
}

/// Exit-price sensitivity sweep.
pub fn sweep(input: &SweepInput) -> FeeCalcResult<ComputationOutput<Vec<SensitivityPoint>>> {
    let start = Instant::now();
    check_offer_set(&input.offers)?;

    let points = compute_sensitivity(&input.scenario, &input.offers, input.steps);
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Exit price sensitivity over [0.25x, 3.0x] of base",
        &serde_json::json!({
            "base_exit_price": input.scenario.exit_price().to_string(),
            "steps": input.steps,
        }),
        Vec::new(),
        elapsed,
        points,
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrInput {
    /// Periodic cash flows, index 0 = initial outlay
    pub cash_flows: Vec<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrOutput {
    pub irr: Option<Rate>,
    /// NPV at the solved rate, as a residual check
    pub npv_at_irr: Option<Money>,
}

/// IRR of a periodic cash-flow series. An undetermined IRR is a result,
/// reported with a warning, not an error.
pub fn solve_irr(input: &IrrInput) -> FeeCalcResult<ComputationOutput<IrrOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let irr = time_value::solve_irr(&input.cash_flows);
    let npv_at_irr = match irr {
        Some(rate) => Some(npv(rate, &input.cash_flows)?),
        None => {
            warnings.push(if input.cash_flows.len() < 2 {
                "At least two cash flows are needed for an IRR".to_string()
            } else {
                "No IRR: cash flows have no sign change or no bracketed root".to_string()
            });
            None
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "IRR: Newton-Raphson from 10% with bisection fallback on [-0.5, 10]",
        &serde_json::json!({ "periods": input.cash_flows.len() }),
        warnings,
        elapsed,
        IrrOutput { irr, npv_at_irr },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{default_offers, default_scenario};
    use crate::error::FeeCalcError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn preset_input() -> AnalysisInput {
        AnalysisInput {
            scenario: default_scenario(),
            offers: default_offers(),
            sensitivity_steps: 10,
        }
    }

    #[test]
    fn test_analyze_presets() {
        let out = analyze(&preset_input()).unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.results.len(), 2);
        assert_eq!(out.result.sensitivity.len(), 11);
        assert_eq!(out.result.comparison.rows.len(), 9);
        assert!(out.result.offer_issues.is_empty());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_validation_issues_become_warnings() {
        let mut input = preset_input();
        input.offers[0].carry_rate = dec!(1.5);
        input.scenario.time_horizon = 40;
        let out = analyze(&input).unwrap();
        assert_eq!(out.result.scenario_issues.len(), 1);
        assert_eq!(out.result.offer_issues.len(), 1);
        assert_eq!(out.result.offer_issues[0].offer_id, "offer-1");
        assert!(out.warnings.iter().any(|w| w.starts_with("scenario.time_horizon")));
        assert!(out.warnings.iter().any(|w| w.starts_with("Fund A: carry_rate")));
    }

    #[test]
    fn test_structural_errors() {
        let mut input = preset_input();
        input.offers.clear();
        assert!(matches!(analyze(&input), Err(FeeCalcError::InsufficientData(_))));

        let mut input = preset_input();
        input.offers[1].id = "offer-1".into();
        assert!(matches!(analyze(&input), Err(FeeCalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_undetermined_irr_warning() {
        let mut input = preset_input();
        input.offers[1].price_per_share = Decimal::ZERO;
        let out = analyze(&input).unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("net IRR is undetermined")));
    }

    #[test]
    fn test_default_steps_when_omitted() {
        let json = serde_json::json!({
            "scenario": default_scenario(),
            "offers": default_offers(),
        });
        let input: AnalysisInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.sensitivity_steps, 25);
    }

    #[test]
    fn test_solve_irr_wrapper() {
        let out = solve_irr(&IrrInput {
            cash_flows: vec![dec!(-100), dec!(0), dec!(121)],
        })
        .unwrap();
        let irr = out.result.irr.unwrap();
        assert!((irr - dec!(0.10)).abs() < dec!(0.000001));
        assert!(out.result.npv_at_irr.unwrap().abs() < dec!(0.0001));

        let none = solve_irr(&IrrInput {
            cash_flows: vec![dec!(-100), dec!(-10), dec!(-10)],
        })
        .unwrap();
        assert_eq!(none.result.irr, None);
        assert_eq!(none.warnings.len(), 1);
    }

    #[test]
    fn test_evaluate_and_sweep_wrappers() {
        let scenario = default_scenario();
        let offer = default_offers().remove(0);
        let out = evaluate(&EvaluateInput {
            scenario: scenario.clone(),
            offer: offer.clone(),
        });
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.offer_id, "offer-1");

        let swept = sweep(&SweepInput {
            scenario,
            offers: vec![offer],
            steps: 25,
        })
        .unwrap();
        assert_eq!(swept.result.len(), 26);
    }
}
