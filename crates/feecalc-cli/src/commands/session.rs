use clap::Args;
use serde::Serialize;
use serde_json::Value;

use feecalc_core::analysis::{self, AnalysisInput, SweepInput};
use feecalc_core::session::{load_session, Session};
use feecalc_core::sensitivity::DEFAULT_SENSITIVITY_STEPS;
use feecalc_core::validation::{validate_offer, validate_scenario, ValidationIssue};

use super::offer::ScenarioArgs;
use crate::input;

/// Session document from `--input` or stdin (any schema version), else the
/// default presets.
fn read_session(path: Option<&str>) -> Result<Session, Box<dyn std::error::Error>> {
    match input::read_document(path)? {
        Some(doc) => Ok(load_session(&doc.to_string())?),
        None => Ok(Session::default()),
    }
}

/// Arguments for a full multi-offer comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a JSON/YAML session document (defaults to the presets)
    #[arg(long)]
    pub input: Option<String>,

    /// Sensitivity sweep intervals
    #[arg(long, default_value_t = DEFAULT_SENSITIVITY_STEPS)]
    pub steps: u32,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut session = read_session(args.input.as_deref())?;
    args.scenario.apply(&mut session.scenario);

    let result = analysis::analyze(&AnalysisInput {
        scenario: session.scenario,
        offers: session.offers,
        sensitivity_steps: args.steps,
    })?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the exit-price sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a JSON/YAML session document (defaults to the presets)
    #[arg(long)]
    pub input: Option<String>,

    /// Sweep intervals (points = steps + 1)
    #[arg(long, default_value_t = DEFAULT_SENSITIVITY_STEPS)]
    pub steps: u32,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut session = read_session(args.input.as_deref())?;
    args.scenario.apply(&mut session.scenario);

    let result = analysis::sweep(&SweepInput {
        scenario: session.scenario,
        offers: session.offers,
        steps: args.steps,
    })?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for validating a session document
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a JSON/YAML session document
    #[arg(long)]
    pub input: Option<String>,
}

/// Validation issues for one offer of a session document.
#[derive(Debug, Serialize)]
pub struct OfferReport {
    pub offer_id: String,
    pub offer_name: String,
    pub issues: Vec<ValidationIssue>,
}

/// Result of `feecalc validate`.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub scenario_issues: Vec<ValidationIssue>,
    pub offer_issues: Vec<OfferReport>,
}

impl ValidationReport {
    pub fn for_session(session: &Session) -> Self {
        let scenario_issues = validate_scenario(&session.scenario);
        let offer_issues: Vec<OfferReport> = session
            .offers
            .iter()
            .map(|offer| OfferReport {
                offer_id: offer.id.clone(),
                offer_name: offer.name.clone(),
                issues: validate_offer(offer),
            })
            .collect();
        let valid =
            scenario_issues.is_empty() && offer_issues.iter().all(|o| o.issues.is_empty());
        Self {
            valid,
            scenario_issues,
            offer_issues,
        }
    }
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = match input::read_document(args.input.as_deref())? {
        Some(doc) => load_session(&doc.to_string())?,
        None => return Err("--input <file> or stdin required for validate".into()),
    };

    Ok(serde_json::to_value(ValidationReport::for_session(&session))?)
}

/// Print the default session document (current schema, both presets).
pub fn run_init() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(Session::default().to_file())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_report_for_presets_is_valid() {
        let report = ValidationReport::for_session(&Session::default());
        assert!(report.valid);
        assert_eq!(report.offer_issues.len(), 2);
        assert!(report.offer_issues.iter().all(|o| o.issues.is_empty()));
    }

    #[test]
    fn test_report_flags_offer_issue() {
        let mut session = Session::default();
        session.offers[1].price_per_share = Decimal::ZERO;
        let report = ValidationReport::for_session(&session);
        assert!(!report.valid);
        assert!(report.scenario_issues.is_empty());
        assert_eq!(report.offer_issues[1].offer_id, "offer-2");
        assert_eq!(report.offer_issues[1].issues[0].field, "price_per_share");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["offer_issues"][1]["offer_name"], "Direct / No Fees");
    }
}
