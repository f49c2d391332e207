use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn suffix_multiplier(suffix: char) -> Option<Decimal> {
    match suffix {
        'k' => Some(dec!(1000)),
        'm' => Some(dec!(1000000)),
        'b' => Some(dec!(1000000000)),
        _ => None,
    }
}

/// `-?\d*\.?\d+`: optional sign, digits with at most one point, ending in a
/// digit.
fn is_plain_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut seen_point = false;
    for ch in digits.chars() {
        match ch {
            '0'..='9' => {}
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    digits.ends_with(|c: char| c.is_ascii_digit())
}

/// Parse a human-entered amount: `250000`, `250,000`, `250k`, `1.5M`,
/// `-2.5`, `.5`. Returns `None` for empty or malformed input.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .collect::<String>()
        .to_ascii_lowercase();

    let (number, multiplier) = match cleaned.chars().last().and_then(suffix_multiplier) {
        Some(multiplier) => (cleaned[..cleaned.len() - 1].trim_end(), multiplier),
        None => (cleaned.as_str(), Decimal::ONE),
    };

    if !is_plain_number(number) {
        return None;
    }

    let normalized = match number.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => format!("-0{rest}"),
        _ if number.starts_with('.') => format!("0{number}"),
        _ => number.to_string(),
    };
    Decimal::from_str(&normalized).ok()?.checked_mul(multiplier)
}

/// Parse a rate. A trailing `%` means percent units (`2%` → `0.02`);
/// a bare number is already a decimal rate.
pub fn parse_rate(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    match trimmed.strip_suffix('%') {
        Some(percent) => parse_amount(percent).map(|v| v / dec!(100)),
        None => parse_amount(trimmed),
    }
}

/// Bound `value` to the optional `[min, max]` range.
pub fn clamp(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> Decimal {
    let value = min.map_or(value, |lo| value.max(lo));
    max.map_or(value, |hi| value.min(hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_grouped() {
        assert_eq!(parse_amount("250000"), Some(dec!(250000)));
        assert_eq!(parse_amount(" 250,000 "), Some(dec!(250000)));
        assert_eq!(parse_amount("12.75"), Some(dec!(12.75)));
        assert_eq!(parse_amount(".5"), Some(dec!(0.5)));
        assert_eq!(parse_amount("-.5"), Some(dec!(-0.5)));
        assert_eq!(parse_amount("-3"), Some(dec!(-3)));
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(parse_amount("250k"), Some(dec!(250000)));
        assert_eq!(parse_amount("1.5M"), Some(dec!(1500000)));
        assert_eq!(parse_amount("2 b"), Some(dec!(2000000000)));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("5."), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("k"), None);
        assert_eq!(parse_amount("12x"), None);
        assert_eq!(parse_amount("1e5"), None);
    }

    #[test]
    fn test_rates() {
        assert_eq!(parse_rate("2%"), Some(dec!(0.02)));
        assert_eq!(parse_rate("0.08"), Some(dec!(0.08)));
        assert_eq!(parse_rate("12.5 %"), Some(dec!(0.125)));
        assert_eq!(parse_rate("%"), None);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(dec!(40), Some(dec!(1)), Some(dec!(30))), dec!(30));
        assert_eq!(clamp(dec!(-1), Some(Decimal::ZERO), None), Decimal::ZERO);
        assert_eq!(clamp(dec!(7), None, None), dec!(7));
    }
}
