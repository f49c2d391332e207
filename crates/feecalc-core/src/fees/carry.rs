use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Performance-fee terms fed through the waterfall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarryTerms {
    /// Carried interest rate on profit
    pub carry_rate: Rate,
    /// Annually compounding preferred return
    pub hurdle_rate: Rate,
    /// GP share of profit above the hurdle until the carry target is met
    pub catch_up_rate: Rate,
}

/// Stage-by-stage outcome of the European waterfall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarryWaterfall {
    /// Gross profit over the investment
    pub gross_profit: Money,
    /// Compounded preferred return owed to the investor first
    pub preferred_return: Money,
    /// Profit left once the preferred return is paid
    pub profit_above_hurdle: Money,
    /// GP take during the catch-up phase
    pub catch_up_carry: Money,
    /// GP take at the plain carry rate after catch-up
    pub residual_carry: Money,
    /// Total carry paid to the GP
    pub carry: Money,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Preferred return `investment × ((1 + hurdle)^years − 1)`.
///
/// Returns `None` when the compounded factor is not representable, i.e. the
/// hurdle can never be cleared.
pub fn preferred_return(investment: Money, hurdle_rate: Rate, years: u32) -> Option<Money> {
    if hurdle_rate.is_zero() {
        return Some(Decimal::ZERO);
    }
    let growth = (Decimal::ONE + hurdle_rate).checked_powi(i64::from(years))?;
    investment.checked_mul(growth - Decimal::ONE)
}

/// European (whole-fund) carry on `gross_profit`.
///
/// Return of capital and the preferred return go to the investor first. With
/// a catch-up the GP then takes `catch_up_rate` of the profit above the
/// hurdle until it holds `carry_rate` of all profit; the remainder splits at
/// `carry_rate`.
pub fn european_carry(
    investment: Money,
    gross_profit: Money,
    terms: &CarryTerms,
    years: u32,
) -> CarryWaterfall {
    let mut out = CarryWaterfall {
        gross_profit,
        ..CarryWaterfall::default()
    };

    if terms.carry_rate <= Decimal::ZERO || gross_profit <= Decimal::ZERO {
        return out;
    }

    let Some(pref) = preferred_return(investment, terms.hurdle_rate, years) else {
        return out;
    };
    out.preferred_return = pref;

    if gross_profit <= pref {
        return out;
    }

    let above_hurdle = gross_profit - pref;
    out.profit_above_hurdle = above_hurdle;

    if terms.catch_up_rate <= Decimal::ZERO {
        out.residual_carry = above_hurdle.saturating_mul(terms.carry_rate);
        out.carry = out.residual_carry;
        return out;
    }

    // Profit above the hurdle needed for the GP to reach its target share.
    // An unrepresentable amount is never reached.
    let target_gp_share = gross_profit.saturating_mul(terms.carry_rate);
    let catch_up_amount = target_gp_share
        .checked_div(terms.catch_up_rate)
        .filter(|amount| above_hurdle > *amount);

    match catch_up_amount {
        None => {
            out.catch_up_carry = above_hurdle.saturating_mul(terms.catch_up_rate);
        }
        Some(amount) => {
            out.catch_up_carry = amount.saturating_mul(terms.catch_up_rate);
            out.residual_carry = (above_hurdle - amount).saturating_mul(terms.carry_rate);
        }
    }
    out.carry = out.catch_up_carry.saturating_add(out.residual_carry);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn standard_terms() -> CarryTerms {
        CarryTerms {
            carry_rate: dec!(0.20),
            hurdle_rate: dec!(0.08),
            catch_up_rate: dec!(1.0),
        }
    }

    #[test]
    fn test_preferred_return_compounds() {
        // 100,000 × (1.08^3 − 1) = 25,971.20
        let pref = preferred_return(dec!(100000), dec!(0.08), 3).unwrap();
        assert_eq!(pref, dec!(25971.20));
    }

    #[test]
    fn test_preferred_return_zero_hurdle() {
        assert_eq!(preferred_return(dec!(100000), dec!(0), 10), Some(Decimal::ZERO));
    }

    #[test]
    fn test_preferred_return_overflow_is_unreachable() {
        assert_eq!(preferred_return(dec!(100000), dec!(1000), 30), None);
    }

    #[test]
    fn test_no_carry_below_hurdle() {
        let wf = european_carry(dec!(100000), dec!(25000), &standard_terms(), 3);
        assert_eq!(wf.carry, Decimal::ZERO);
        assert_eq!(wf.preferred_return, dec!(25971.20));
    }

    #[test]
    fn test_no_carry_on_loss() {
        let wf = european_carry(dec!(100000), dec!(-5000), &standard_terms(), 3);
        assert_eq!(wf.carry, Decimal::ZERO);
    }

    #[test]
    fn test_no_carry_when_rate_is_zero() {
        let terms = CarryTerms {
            carry_rate: Decimal::ZERO,
            ..standard_terms()
        };
        let wf = european_carry(dec!(100000), dec!(200000), &terms, 3);
        assert_eq!(wf.carry, Decimal::ZERO);
    }

    #[test]
    fn test_plain_carry_without_hurdle_or_catch_up() {
        let terms = CarryTerms {
            carry_rate: dec!(0.20),
            hurdle_rate: Decimal::ZERO,
            catch_up_rate: Decimal::ZERO,
        };
        let wf = european_carry(dec!(100000), dec!(200000), &terms, 3);
        assert_eq!(wf.carry, dec!(40000));
    }

    #[test]
    fn test_hurdle_without_catch_up() {
        let terms = CarryTerms {
            catch_up_rate: Decimal::ZERO,
            ..standard_terms()
        };
        let wf = european_carry(dec!(100000), dec!(200000), &terms, 3);
        // (200,000 − 25,971.20) × 0.20
        assert_eq!(wf.carry, dec!(34805.760));
        assert_eq!(wf.catch_up_carry, Decimal::ZERO);
    }

    #[test]
    fn test_full_catch_up_then_residual_split() {
        // catch-up amount = 40,000 / 1.0 → GP 40,000
        // residual = (174,028.80 − 40,000) × 0.2 = 26,805.76
        let wf = european_carry(dec!(100000), dec!(200000), &standard_terms(), 3);
        assert_eq!(wf.catch_up_carry, dec!(40000));
        assert_eq!(wf.residual_carry, dec!(26805.760));
        assert_eq!(wf.carry, dec!(66805.760));
    }

    #[test]
    fn test_partial_catch_up() {
        // Profit 30,000: 4,028.80 above the hurdle, all of it to the GP
        // (catch-up target 6,000 is not reached)
        let wf = european_carry(dec!(100000), dec!(30000), &standard_terms(), 3);
        assert_eq!(wf.profit_above_hurdle, dec!(4028.80));
        assert_eq!(wf.carry, dec!(4028.80));
    }

    #[test]
    fn test_tiny_catch_up_rate_stays_in_catch_up() {
        // 40,000 / 1e-27 is beyond the Decimal range
        let terms = CarryTerms {
            catch_up_rate: dec!(0.000000000000000000000000001),
            ..standard_terms()
        };
        let wf = european_carry(dec!(100000), dec!(200000), &terms, 3);
        assert_eq!(wf.residual_carry, Decimal::ZERO);
        assert_eq!(wf.carry, wf.catch_up_carry);
        assert!(wf.carry < dec!(0.000001));
    }

    #[test]
    fn test_carry_saturates_on_extreme_profit() {
        let terms = CarryTerms {
            carry_rate: dec!(0.5),
            hurdle_rate: Decimal::ZERO,
            catch_up_rate: Decimal::ZERO,
        };
        let huge = Decimal::MAX - dec!(1);
        let wf = european_carry(Decimal::ZERO, huge, &terms, 3);
        assert!(wf.carry > Decimal::ZERO);
        let steep = CarryTerms {
            carry_rate: dec!(5),
            ..terms
        };
        let wf = european_carry(Decimal::ZERO, huge, &steep, 3);
        assert_eq!(wf.carry, Decimal::MAX);
    }

    #[test]
    fn test_eighty_percent_catch_up() {
        let terms = CarryTerms {
            catch_up_rate: dec!(0.8),
            ..standard_terms()
        };
        let wf = european_carry(dec!(100000), dec!(200000), &terms, 3);
        // catch-up amount = 40,000 / 0.8 = 50,000 → GP 40,000
        // residual = (174,028.80 − 50,000) × 0.2 = 24,805.76
        assert_eq!(wf.catch_up_carry, dec!(40000));
        assert_eq!(wf.residual_carry, dec!(24805.760));
        assert_eq!(wf.carry, dec!(64805.760));
    }
}
