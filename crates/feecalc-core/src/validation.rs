use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::offer::Offer;
use crate::scenario::{PriceMode, Scenario, MAX_TIME_HORIZON};

/// A field the surrounding UI should flag for correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: &str) -> Self {
        Self {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

const MUST_BE_POSITIVE: &str = "Must be positive";
const CANNOT_BE_NEGATIVE: &str = "Cannot be negative";
const FRACTION_RANGE: &str = "Must be between 0 and 1 (0%-100%)";

fn is_fraction(value: Decimal) -> bool {
    (Decimal::ZERO..=Decimal::ONE).contains(&value)
}

/// Problems with the shared scenario. Empty means valid.
pub fn validate_scenario(scenario: &Scenario) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if scenario.investment_amount <= Decimal::ZERO {
        issues.push(ValidationIssue::new("investment_amount", MUST_BE_POSITIVE));
    }

    match scenario.price_mode {
        PriceMode::PerShare => {
            if scenario.exit_price_per_share <= Decimal::ZERO {
                issues.push(ValidationIssue::new("exit_price_per_share", MUST_BE_POSITIVE));
            }
        }
        PriceMode::Valuation => {
            if scenario.exit_valuation <= Decimal::ZERO {
                issues.push(ValidationIssue::new("exit_valuation", MUST_BE_POSITIVE));
            }
            if scenario.shares_outstanding <= Decimal::ZERO {
                issues.push(ValidationIssue::new("shares_outstanding", MUST_BE_POSITIVE));
            }
        }
    }

    if scenario.time_horizon == 0 {
        issues.push(ValidationIssue::new("time_horizon", MUST_BE_POSITIVE));
    }
    if scenario.time_horizon > MAX_TIME_HORIZON {
        issues.push(ValidationIssue::new("time_horizon", "Max 30 years"));
    }

    issues
}

/// Problems with one offer's terms. Empty means valid.
pub fn validate_offer(offer: &Offer) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if offer.price_per_share <= Decimal::ZERO {
        issues.push(ValidationIssue::new("price_per_share", MUST_BE_POSITIVE));
    }
    if offer.management_fee_rate < Decimal::ZERO {
        issues.push(ValidationIssue::new("management_fee_rate", CANNOT_BE_NEGATIVE));
    }
    if !is_fraction(offer.carry_rate) {
        issues.push(ValidationIssue::new("carry_rate", FRACTION_RANGE));
    }
    if offer.hurdle_rate < Decimal::ZERO {
        issues.push(ValidationIssue::new("hurdle_rate", CANNOT_BE_NEGATIVE));
    }
    if !is_fraction(offer.catch_up_rate) {
        issues.push(ValidationIssue::new("catch_up_rate", FRACTION_RANGE));
    }
    if offer.setup_fee.quoted() < Decimal::ZERO {
        issues.push(ValidationIssue::new("setup_fee", CANNOT_BE_NEGATIVE));
    }
    if offer.placement_fee_rate < Decimal::ZERO {
        issues.push(ValidationIssue::new("placement_fee_rate", CANNOT_BE_NEGATIVE));
    }
    if offer.admin_fee.quoted() < Decimal::ZERO {
        issues.push(ValidationIssue::new("admin_fee", CANNOT_BE_NEGATIVE));
    }

    for (i, tier) in offer.hurdle_tiers.iter().enumerate() {
        if tier.moic_floor < Decimal::ZERO {
            issues.push(ValidationIssue::new(
                format!("hurdle_tiers[{i}].moic_floor"),
                CANNOT_BE_NEGATIVE,
            ));
        }
        if tier.moic_ceiling <= tier.moic_floor {
            issues.push(ValidationIssue::new(
                format!("hurdle_tiers[{i}].moic_ceiling"),
                "Must exceed the floor",
            ));
        }
        if !is_fraction(tier.carry_rate) {
            issues.push(ValidationIssue::new(
                format!("hurdle_tiers[{i}].carry_rate"),
                FRACTION_RANGE,
            ));
        }
    }

    issues
}

pub fn is_scenario_valid(scenario: &Scenario) -> bool {
    validate_scenario(scenario).is_empty()
}

pub fn is_offer_valid(offer: &Offer) -> bool {
    validate_offer(offer).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{default_scenario, preset_fund};
    use crate::offer::{FeeAmount, HurdleTier};
    use rust_decimal_macros::dec;

    fn fields(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.field.as_str()).collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(is_scenario_valid(&default_scenario()));
        assert!(is_offer_valid(&preset_fund("a", "#6366f1")));
    }

    #[test]
    fn test_scenario_positivity() {
        let s = Scenario::new(Decimal::ZERO, dec!(-1), 0);
        assert_eq!(
            fields(&validate_scenario(&s)),
            vec!["investment_amount", "exit_price_per_share", "time_horizon"]
        );
    }

    #[test]
    fn test_horizon_cap() {
        let s = Scenario::new(dec!(100000), dec!(300), 31);
        let issues = validate_scenario(&s);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Max 30 years");
        assert!(is_scenario_valid(&Scenario::new(dec!(100000), dec!(300), 30)));
    }

    #[test]
    fn test_valuation_mode_fields() {
        let s = Scenario::from_valuation(dec!(100000), Decimal::ZERO, Decimal::ZERO, 3);
        assert_eq!(
            fields(&validate_scenario(&s)),
            vec!["exit_valuation", "shares_outstanding"]
        );
    }

    #[test]
    fn test_offer_ranges() {
        let mut o = preset_fund("a", "#6366f1");
        o.price_per_share = Decimal::ZERO;
        o.carry_rate = dec!(1.2);
        o.catch_up_rate = dec!(-0.1);
        o.hurdle_rate = dec!(-0.01);
        o.setup_fee = FeeAmount::Flat(dec!(-5));
        o.admin_fee = FeeAmount::Percent(dec!(-0.01));
        assert_eq!(
            fields(&validate_offer(&o)),
            vec![
                "price_per_share",
                "carry_rate",
                "hurdle_rate",
                "catch_up_rate",
                "setup_fee",
                "admin_fee"
            ]
        );
    }

    #[test]
    fn test_boundary_rates_are_valid() {
        let mut o = preset_fund("a", "#6366f1");
        o.carry_rate = Decimal::ONE;
        o.catch_up_rate = Decimal::ZERO;
        assert!(is_offer_valid(&o));
    }

    #[test]
    fn test_tier_checks() {
        let mut o = preset_fund("a", "#6366f1");
        o.hurdle_tiers = vec![
            HurdleTier {
                moic_floor: dec!(1),
                moic_ceiling: dec!(2),
                carry_rate: dec!(0.2),
            },
            HurdleTier {
                moic_floor: dec!(3),
                moic_ceiling: dec!(3),
                carry_rate: dec!(25),
            },
        ];
        assert_eq!(
            fields(&validate_offer(&o)),
            vec!["hurdle_tiers[1].moic_ceiling", "hurdle_tiers[1].carry_rate"]
        );
    }
}
