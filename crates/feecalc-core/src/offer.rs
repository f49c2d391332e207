use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FeeCalcError;
use crate::types::{Money, Multiple, Rate, MAX_OFFERS};
use crate::FeeCalcResult;

/// Display palette handed out to offers in creation order.
pub const OFFER_COLORS: [&str; 5] = ["#6366f1", "#14b8a6", "#f59e0b", "#f43f5e", "#8b5cf6"];

/// Next palette color for a collection that currently holds `offer_count`
/// offers.
pub fn palette_color(offer_count: usize) -> &'static str {
    OFFER_COLORS[offer_count % OFFER_COLORS.len()]
}

/// Capital base the management fee is charged on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementFeeBasis {
    #[default]
    CommittedCapital,
    InvestedCapital,
    NetAssetValue,
}

/// A fee quoted either as a flat amount or as a fraction of the investment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FeeAmount {
    Flat(Money),
    Percent(Rate),
}

impl Default for FeeAmount {
    fn default() -> Self {
        FeeAmount::Flat(Decimal::ZERO)
    }
}

impl FeeAmount {
    /// Currency amount of the fee against `investment`.
    pub fn amount_on(&self, investment: Money) -> Money {
        match self {
            FeeAmount::Flat(amount) => *amount,
            FeeAmount::Percent(rate) => investment.saturating_mul(*rate),
        }
    }

    /// The quoted number, whichever unit it is in.
    pub fn quoted(&self) -> Decimal {
        match self {
            FeeAmount::Flat(amount) => *amount,
            FeeAmount::Percent(rate) => *rate,
        }
    }
}

/// One band of an escalating carry schedule: `carry_rate` applies while the
/// gross multiple sits in `[moic_floor, moic_ceiling)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HurdleTier {
    pub moic_floor: Multiple,
    pub moic_ceiling: Multiple,
    pub carry_rate: Rate,
}

impl HurdleTier {
    pub fn contains(&self, multiple: Multiple) -> bool {
        self.moic_floor <= multiple && multiple < self.moic_ceiling
    }
}

/// Terms of one investment vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub name: String,
    /// Display color, e.g. "#6366f1"
    pub color: String,
    /// Entry price paid per share
    pub price_per_share: Money,
    /// Annual management fee rate
    #[serde(default)]
    pub management_fee_rate: Rate,
    #[serde(default)]
    pub management_fee_basis: ManagementFeeBasis,
    /// Annual administration fee
    #[serde(default)]
    pub admin_fee: FeeAmount,
    /// One-time setup fee, paid on top of the investment
    #[serde(default)]
    pub setup_fee: FeeAmount,
    /// One-time placement fee rate on the investment
    #[serde(default)]
    pub placement_fee_rate: Rate,
    /// Carried interest (performance fee) rate
    #[serde(default)]
    pub carry_rate: Rate,
    /// Annually compounding preferred return
    #[serde(default)]
    pub hurdle_rate: Rate,
    /// GP share of profit above the hurdle during catch-up
    #[serde(default)]
    pub catch_up_rate: Rate,
    /// Escalating carry bands, selected by gross multiple
    #[serde(default)]
    pub hurdle_tiers: Vec<HurdleTier>,
}

impl Offer {
    /// Carry rate applicable at a gross multiple on the investment: the
    /// first tier containing `gross_multiple`, else the flat carry rate.
    pub fn carry_rate_at(&self, gross_multiple: Multiple) -> Rate {
        self.hurdle_tiers
            .iter()
            .find(|tier| tier.contains(gross_multiple))
            .map(|tier| tier.carry_rate)
            .unwrap_or(self.carry_rate)
    }
}

/// Structural checks on an offer collection: 1 to 5 offers, unique ids.
pub fn check_offer_set(offers: &[Offer]) -> FeeCalcResult<()> {
    if offers.is_empty() {
        return Err(FeeCalcError::InsufficientData(
            "At least one offer is required".into(),
        ));
    }
    if offers.len() > MAX_OFFERS {
        return Err(FeeCalcError::InvalidInput {
            field: "offers".into(),
            reason: format!("At most {MAX_OFFERS} offers can be compared, got {}", offers.len()),
        });
    }
    let mut seen = HashSet::new();
    for offer in offers {
        if !seen.insert(offer.id.as_str()) {
            return Err(FeeCalcError::InvalidInput {
                field: "offers".into(),
                reason: format!("Duplicate offer id '{}'", offer.id),
            });
        }
    }
    Ok(())
}
