use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::offer::{ManagementFeeBasis, Offer};
use crate::types::Money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One-time fees charged on top of the investment at entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpfrontFees {
    pub setup_fee: Money,
    pub placement_fee: Money,
}

impl UpfrontFees {
    pub fn total(&self) -> Money {
        self.setup_fee.saturating_add(self.placement_fee)
    }
}

/// Recurring fees charged in one year of the holding period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearFees {
    pub year: u32,
    /// Straight-line NAV estimate used for NAV-based management fees
    pub nav: Money,
    pub management_fee: Money,
    pub admin_fee: Money,
}

impl YearFees {
    pub fn total(&self) -> Money {
        self.management_fee.saturating_add(self.admin_fee)
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Straight-line NAV estimate for `year` of `horizon`: the investment at
/// year 0 growing linearly to the gross exit value in the final year.
///
/// Fee arithmetic in this module saturates at the Decimal range instead of
/// overflowing.
pub fn nav_estimate(
    investment: Money,
    gross_exit_value: Money,
    year: u32,
    horizon: u32,
) -> Money {
    if year >= horizon {
        return gross_exit_value;
    }
    let gain_to_date = gross_exit_value
        .saturating_sub(investment)
        .saturating_mul(Decimal::from(year))
        / Decimal::from(horizon);
    investment.saturating_add(gain_to_date)
}

/// Management fee for one year, on committed/invested capital or on `nav`.
pub fn annual_management_fee(offer: &Offer, investment: Money, nav: Money) -> Money {
    let basis = match offer.management_fee_basis {
        ManagementFeeBasis::CommittedCapital | ManagementFeeBasis::InvestedCapital => investment,
        ManagementFeeBasis::NetAssetValue => nav,
    };
    basis.saturating_mul(offer.management_fee_rate)
}

/// Admin fee for one year.
pub fn annual_admin_fee(offer: &Offer, investment: Money) -> Money {
    offer.admin_fee.amount_on(investment)
}

/// Setup and placement fees for an investment.
pub fn upfront_fees(offer: &Offer, investment: Money) -> UpfrontFees {
    UpfrontFees {
        setup_fee: offer.setup_fee.amount_on(investment),
        placement_fee: investment.saturating_mul(offer.placement_fee_rate),
    }
}

/// Recurring fees for years `1..=horizon`, each year computed on its own NAV
/// estimate.
pub fn fee_schedule(
    offer: &Offer,
    investment: Money,
    gross_exit_value: Money,
    horizon: u32,
) -> Vec<YearFees> {
    (1..=horizon)
        .map(|year| {
            let nav = nav_estimate(investment, gross_exit_value, year, horizon);
            YearFees {
                year,
                nav,
                management_fee: annual_management_fee(offer, investment, nav),
                admin_fee: annual_admin_fee(offer, investment),
            }
        })
        .collect()
}
