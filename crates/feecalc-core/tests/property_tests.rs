use feecalc_core::defaults::default_offer;
use feecalc_core::evaluator::evaluate_offer;
use feecalc_core::sensitivity::compute_sensitivity;
use feecalc_core::time_value::solve_irr;
use feecalc_core::{FeeAmount, Offer, Scenario};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Basis points → decimal rate.
fn bp(value: u32) -> Decimal {
    Decimal::from(value) / dec!(10000)
}

fn offer_with_percent_fees(mgmt_bp: u32, carry_bp: u32, hurdle_bp: u32, catch_up_bp: u32) -> Offer {
    Offer {
        management_fee_rate: bp(mgmt_bp),
        carry_rate: bp(carry_bp),
        hurdle_rate: bp(hurdle_bp),
        catch_up_rate: bp(catch_up_bp),
        setup_fee: FeeAmount::Percent(dec!(0.01)),
        admin_fee: FeeAmount::Percent(dec!(0.002)),
        placement_fee_rate: dec!(0.005),
        ..default_offer("p", "Prop", "#6366f1")
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_irr_undetermined_without_sign_change(
        flows in prop::collection::vec(0i64..1_000_000, 2..12),
        negate in any::<bool>(),
    ) {
        let series: Vec<Decimal> = flows
            .into_iter()
            .map(|v| if negate { Decimal::from(-v) } else { Decimal::from(v) })
            .collect();
        prop_assert_eq!(solve_irr(&series), None);
    }

    #[test]
    fn prop_moic_is_scale_invariant(
        investment in 1_000u32..5_000_000,
        exit_price in 10u32..1_000,
        years in 1u32..15,
        mgmt_bp in 0u32..300,
        carry_bp in 0u32..3_000,
        hurdle_bp in 0u32..1_200,
        catch_up_bp in 0u32..=10_000,
    ) {
        let offer = offer_with_percent_fees(mgmt_bp, carry_bp, hurdle_bp, catch_up_bp);
        let base = Scenario::new(Decimal::from(investment), Decimal::from(exit_price), years);
        let doubled = Scenario::new(Decimal::from(investment) * dec!(2), Decimal::from(exit_price), years);

        let a = evaluate_offer(&base, &offer);
        let b = evaluate_offer(&doubled, &offer);
        prop_assert!((a.net_moic - b.net_moic).abs() < dec!(0.0000001));
        prop_assert!((a.gross_moic - b.gross_moic).abs() < dec!(0.0000001));
    }

    #[test]
    fn prop_break_even_round_trip(
        investment in 10_000u32..1_000_000,
        price in 1u32..500,
        years in 1u32..10,
        mgmt_bp in 0u32..300,
        carry_bp in 0u32..3_000,
        hurdle_bp in 0u32..1_000,
        catch_up_bp in 0u32..=10_000,
    ) {
        let mut offer = offer_with_percent_fees(mgmt_bp, carry_bp, hurdle_bp, catch_up_bp);
        offer.price_per_share = Decimal::from(price);
        let scenario = Scenario::new(Decimal::from(investment), Decimal::from(price) * dec!(2), years);

        let bep = evaluate_offer(&scenario, &offer).break_even_price;
        let at_bep = evaluate_offer(&scenario.with_exit_price(bep), &offer);
        prop_assert!(at_bep.net_return.abs() < dec!(0.01), "net return {}", at_bep.net_return);
    }

    #[test]
    fn prop_evaluation_is_idempotent(
        investment in 1_000u32..1_000_000,
        exit_price in 1u32..1_000,
        years in 0u32..=30,
        carry_bp in 0u32..5_000,
    ) {
        let offer = offer_with_percent_fees(200, carry_bp, 800, 10_000);
        let scenario = Scenario::new(Decimal::from(investment), Decimal::from(exit_price), years);
        prop_assert_eq!(evaluate_offer(&scenario, &offer), evaluate_offer(&scenario, &offer));
    }

    #[test]
    fn prop_sweep_shape(exit_price in 1u32..10_000, steps in 1u32..40) {
        let scenario = Scenario::new(dec!(100000), Decimal::from(exit_price), 3);
        let offers = vec![offer_with_percent_fees(200, 2_000, 800, 10_000)];
        let points = compute_sensitivity(&scenario, &offers, steps);

        prop_assert_eq!(points.len(), steps as usize + 1);
        prop_assert_eq!(points[0].exit_price, Decimal::from(exit_price) * dec!(0.25));
        prop_assert_eq!(points[steps as usize].exit_price, Decimal::from(exit_price) * dec!(3.0));
        prop_assert!(points.windows(2).all(|w| w[0].exit_price < w[1].exit_price));
    }
}
