pub mod irr;
pub mod offer;
pub mod session;

use feecalc_core::parse::{parse_amount, parse_rate};
use feecalc_core::FeeAmount;
use rust_decimal::Decimal;

/// Amount flag: `250000`, `250,000`, `250k`, `1.5m`.
pub fn amount_arg(text: &str) -> Result<Decimal, String> {
    parse_amount(text).ok_or_else(|| format!("invalid amount '{text}' (try 250000, 250k or 1.5m)"))
}

/// Rate flag: `2%` or `0.02`.
pub fn rate_arg(text: &str) -> Result<Decimal, String> {
    parse_rate(text).ok_or_else(|| format!("invalid rate '{text}' (try 2% or 0.02)"))
}

/// Fee flag: a trailing `%` makes it a share of the investment, otherwise
/// a flat amount.
pub fn fee_arg(text: &str) -> Result<FeeAmount, String> {
    if text.trim_end().ends_with('%') {
        rate_arg(text).map(FeeAmount::Percent)
    } else {
        amount_arg(text).map(FeeAmount::Flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsers() {
        assert_eq!(amount_arg("250k"), Ok(Decimal::from(250_000)));
        assert_eq!(rate_arg("2%"), Ok(Decimal::new(2, 2)));
        assert_eq!(fee_arg("1%"), Ok(FeeAmount::Percent(Decimal::new(1, 2))));
        assert_eq!(fee_arg("1,500"), Ok(FeeAmount::Flat(Decimal::from(1500))));
        assert!(amount_arg("lots").is_err());
    }
}
