use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{Money, Multiple, Rate};

const MILLION: Decimal = dec!(1000000);
const THOUSAND: Decimal = dec!(1000);
const COMPACT_THOUSANDS_FROM: Decimal = dec!(10000);

/// Round half away from zero, dropping the sign of a rounded-off zero.
fn round_display(value: Decimal, decimals: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Fixed decimals, no grouping: `12.3`.
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, round_display(value, decimals))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed decimals with thousands separators: `1,234.5`.
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let rounded = round_display(value, decimals);
    let text = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if rounded.is_sign_negative() {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn with_dollar(value: Decimal, body: impl FnOnce(Decimal) -> String) -> String {
    let text = body(value.abs());
    let shows_digits = text.chars().any(|c| ('1'..='9').contains(&c));
    if value.is_sign_negative() && shows_digits {
        format!("-${text}")
    } else {
        format!("${text}")
    }
}

/// Whole dollars with separators: `$1,234`, `-$500`.
pub fn format_currency_full(value: Money) -> String {
    with_dollar(value, |v| format_number(v, 0))
}

/// Dollar price with cents: `$106.00`.
pub fn format_price(value: Money) -> String {
    with_dollar(value, |v| format_number(v, 2))
}

/// Compact currency: `$1.23M` from one million, `$12.3K` from ten
/// thousand, whole dollars below that.
pub fn format_currency(value: Money) -> String {
    with_dollar(value, |v| {
        if v >= MILLION {
            format!("{}M", format_fixed(v / MILLION, 2))
        } else if v >= COMPACT_THOUSANDS_FROM {
            format!("{}K", format_fixed(v / THOUSAND, 1))
        } else {
            format_number(v, 0)
        }
    })
}

/// Rate as a percentage with one decimal: `0.123` → `12.3%`.
pub fn format_percent(value: Rate) -> String {
    format!("{}%", format_fixed(value.saturating_mul(dec!(100)), 1))
}

/// Multiple with two decimals: `2.50x`.
pub fn format_moic(value: Multiple) -> String {
    format!("{}x", format_fixed(value, 2))
}

/// IRR as a percentage, `N/A` when undetermined.
pub fn format_irr(value: Option<Rate>) -> String {
    value.map_or_else(|| "N/A".to_string(), format_percent)
}
