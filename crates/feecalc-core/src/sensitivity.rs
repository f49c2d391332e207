use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::evaluator::{evaluate_reduced, ReducedResult};
use crate::offer::Offer;
use crate::scenario::Scenario;
use crate::types::Money;

/// Number of intervals in a default sweep (26 points).
pub const DEFAULT_SENSITIVITY_STEPS: u32 = 25;

const SWEEP_LOW_MULTIPLE: Decimal = dec!(0.25);
const SWEEP_HIGH_MULTIPLE: Decimal = dec!(3.0);

/// One exit-price sample across every offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub exit_price: Money,
    /// Reduced result keyed by offer id
    pub results: BTreeMap<String, ReducedResult>,
}

/// Exit prices sampled uniformly over `[0.25×, 3.0×]` of `base_price`.
///
/// Returns `steps + 1` prices with both ends exact. With `steps = 0` the
/// single sample is the base price itself.
pub fn sweep_prices(base_price: Money, steps: u32) -> Vec<Money> {
    if steps == 0 {
        return vec![base_price];
    }
    let low = base_price * SWEEP_LOW_MULTIPLE;
    let high = base_price.saturating_mul(SWEEP_HIGH_MULTIPLE);
    let step = (high - low) / Decimal::from(steps);

    (0..=steps)
        .map(|i| if i == steps { high } else { low + step * Decimal::from(i) })
        .collect()
}

/// Re-evaluate every offer at each sampled exit price, keeping only net
/// return, net MOIC and net IRR. Offers never see each other.
pub fn compute_sensitivity(
    scenario: &Scenario,
    offers: &[Offer],
    steps: u32,
) -> Vec<SensitivityPoint> {
    sweep_prices(scenario.exit_price(), steps)
        .into_iter()
        .map(|exit_price| {
            let trial = scenario.with_exit_price(exit_price);
            let results = offers
                .iter()
                .map(|offer| (offer.id.clone(), evaluate_reduced(&trial, offer)))
                .collect();
            SensitivityPoint {
                exit_price,
                results,
            }
        })
        .collect()
}
