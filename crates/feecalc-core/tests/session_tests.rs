#![cfg(feature = "session")]

use feecalc_core::error::FeeCalcError;
use feecalc_core::session::{load_session, Session, Workbench, CURRENT_SCHEMA_VERSION};
use feecalc_core::{FeeAmount, ManagementFeeBasis};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

#[test]
fn test_session_round_trip_through_workbench() {
    let mut workbench = Workbench::new(Session::default());
    workbench.add_offer().unwrap();
    workbench
        .update_offer("offer-3", |o| o.price_per_share = dec!(90))
        .unwrap();

    let json = workbench.session().to_json().unwrap();
    let reloaded = Workbench::new(load_session(&json).unwrap());
    assert_eq!(reloaded.results(), workbench.results());
    assert_eq!(reloaded.sensitivity().len(), 26);
}

#[test]
fn test_current_document_defaults_optional_fields() {
    let json = r##"{
        "version": 2,
        "scenario": { "investment_amount": "250000", "exit_price_per_share": "45", "time_horizon": 5 },
        "offers": [
            { "id": "a", "name": "Feeder", "color": "#6366f1", "price_per_share": "30",
              "management_fee_rate": "0.015", "admin_fee": { "kind": "flat", "value": "500" } }
        ]
    }"##;
    let session = load_session(json).unwrap();
    let offer = &session.offers[0];
    assert_eq!(offer.management_fee_basis, ManagementFeeBasis::CommittedCapital);
    assert_eq!(offer.admin_fee, FeeAmount::Flat(dec!(500)));
    assert_eq!(offer.setup_fee, FeeAmount::Flat(dec!(0)));
    assert!(offer.hurdle_tiers.is_empty());
    assert_eq!(session.scenario.shares_outstanding, dec!(1000000));
    assert_eq!(session.to_file().version, CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_too_many_offers_rejected_on_load() {
    let mut file = Session::default().to_file();
    let template = file.offers[0].clone();
    for i in 3..=6 {
        let mut offer = template.clone();
        offer.id = format!("offer-{i}");
        file.offers.push(offer);
    }
    let json = serde_json::to_string(&file).unwrap();
    assert!(matches!(
        load_session(&json),
        Err(FeeCalcError::InvalidInput { .. })
    ));
}

#[test]
fn test_malformed_json_is_serialization_error() {
    assert!(matches!(
        load_session("{ not json"),
        Err(FeeCalcError::SerializationError(_))
    ));
}
