use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::offer::{palette_color, FeeAmount, ManagementFeeBasis, Offer};
use crate::scenario::Scenario;

/// Starting scenario: 100,000 invested, exit at 300/share after 3 years.
pub fn default_scenario() -> Scenario {
    Scenario::new(dec!(100000), dec!(300), 3)
}

/// Fee-free offer at 100/share.
pub fn default_offer(id: &str, name: &str, color: &str) -> Offer {
    Offer {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        price_per_share: dec!(100),
        management_fee_rate: Decimal::ZERO,
        management_fee_basis: ManagementFeeBasis::CommittedCapital,
        admin_fee: FeeAmount::default(),
        setup_fee: FeeAmount::default(),
        placement_fee_rate: Decimal::ZERO,
        carry_rate: Decimal::ZERO,
        hurdle_rate: Decimal::ZERO,
        catch_up_rate: Decimal::ZERO,
        hurdle_tiers: Vec::new(),
    }
}

/// Classic "2 and 20" fund: 8% hurdle, full catch-up.
pub fn preset_fund(id: &str, color: &str) -> Offer {
    Offer {
        management_fee_rate: dec!(0.02),
        carry_rate: dec!(0.20),
        hurdle_rate: dec!(0.08),
        catch_up_rate: dec!(1.0),
        ..default_offer(id, "Fund A", color)
    }
}

/// Direct purchase at a higher price with no fees.
pub fn preset_direct(id: &str, color: &str) -> Offer {
    Offer {
        price_per_share: dec!(120),
        ..default_offer(id, "Direct / No Fees", color)
    }
}

/// The two presets side by side, colored in palette order.
pub fn default_offers() -> Vec<Offer> {
    vec![
        preset_fund("offer-1", palette_color(0)),
        preset_direct("offer-2", palette_color(1)),
    ]
}

/// Display name for the offer at `position` (0 → "Offer A").
pub fn offer_name_for_position(position: usize) -> String {
    let letter = (b'A' + (position % 26) as u8) as char;
    format!("Offer {letter}")
}
