use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::evaluator::CalculationResult;
use crate::format::{
    format_currency_full, format_irr, format_moic, format_number, format_percent, format_price,
};

/// Values closer than this are treated as a tie.
pub const TIE_TOLERANCE: Decimal = dec!(0.001);

/// Stand-in for an undetermined IRR so it never wins a comparison.
pub const IRR_SENTINEL: Decimal = dec!(-999);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// A compared figure, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    SharesAcquired,
    TotalCashOutlay,
    GrossMoic,
    NetMoic,
    NetIrr,
    NetReturn,
    TotalFees,
    EffectiveFeeRate,
    BreakEvenPrice,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::SharesAcquired,
        Metric::TotalCashOutlay,
        Metric::GrossMoic,
        Metric::NetMoic,
        Metric::NetIrr,
        Metric::NetReturn,
        Metric::TotalFees,
        Metric::EffectiveFeeRate,
        Metric::BreakEvenPrice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::SharesAcquired => "Shares Acquired",
            Metric::TotalCashOutlay => "Total Cash Outlay",
            Metric::GrossMoic => "Gross MOIC",
            Metric::NetMoic => "Net MOIC",
            Metric::NetIrr => "Net IRR",
            Metric::NetReturn => "Net Return",
            Metric::TotalFees => "Total Fees",
            Metric::EffectiveFeeRate => "Effective Fee Rate",
            Metric::BreakEvenPrice => "Break-even Price",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Metric::TotalCashOutlay
            | Metric::TotalFees
            | Metric::EffectiveFeeRate
            | Metric::BreakEvenPrice => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    /// Headline metrics rendered with emphasis.
    pub fn is_highlighted(&self) -> bool {
        matches!(self, Metric::NetMoic | Metric::NetIrr | Metric::NetReturn)
    }

    /// Raw value; `None` only for an undetermined IRR.
    pub fn value(&self, r: &CalculationResult) -> Option<Decimal> {
        match self {
            Metric::SharesAcquired => Some(r.shares_acquired),
            Metric::TotalCashOutlay => Some(r.total_cash_outlay),
            Metric::GrossMoic => Some(r.gross_moic),
            Metric::NetMoic => Some(r.net_moic),
            Metric::NetIrr => r.net_irr,
            Metric::NetReturn => Some(r.net_return),
            Metric::TotalFees => Some(r.total_fees),
            Metric::EffectiveFeeRate => Some(r.effective_fee_rate),
            Metric::BreakEvenPrice => Some(r.break_even_price),
        }
    }

    fn comparable(&self, r: &CalculationResult) -> Decimal {
        self.value(r).unwrap_or(IRR_SENTINEL)
    }

    /// Display text for one offer's cell.
    pub fn format(&self, r: &CalculationResult) -> String {
        match self {
            Metric::SharesAcquired => format_number(r.shares_acquired, 1),
            Metric::GrossMoic => format_moic(r.gross_moic),
            Metric::NetMoic => format_moic(r.net_moic),
            Metric::NetIrr => format_irr(r.net_irr),
            Metric::EffectiveFeeRate => format_percent(r.effective_fee_rate),
            Metric::BreakEvenPrice => format_price(r.break_even_price),
            Metric::TotalCashOutlay => format_currency_full(r.total_cash_outlay),
            Metric::NetReturn => format_currency_full(r.net_return),
            Metric::TotalFees => format_currency_full(r.total_fees),
        }
    }

    fn format_difference(&self, diff: Decimal) -> String {
        match self {
            Metric::GrossMoic | Metric::NetMoic => format_moic(diff),
            Metric::NetIrr | Metric::EffectiveFeeRate => format_percent(diff),
            Metric::SharesAcquired => format_number(diff, 1),
            _ => format_currency_full(diff),
        }
    }
}

/// One metric across every offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: Metric,
    pub label: String,
    pub highlighted: bool,
    pub direction: Direction,
    /// Raw values in offer order (`None` for undetermined IRR)
    pub values: Vec<Option<Decimal>>,
    /// Formatted cells in offer order
    pub display: Vec<String>,
    /// Index of the winning offer, if the values are not all tied
    pub best_index: Option<usize>,
    /// Second offer minus first, present only for exactly two offers
    pub delta: Option<String>,
}

/// Metric × offer grid ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub offer_ids: Vec<String>,
    pub offer_names: Vec<String>,
    pub offer_colors: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Gaps too wide to represent are never ties.
fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    a.checked_sub(b).is_some_and(|diff| diff.abs() < TIE_TOLERANCE)
}

/// Winning offer for `metric`, or `None` with fewer than two offers or when
/// every value lies within [`TIE_TOLERANCE`] of the first. Ties for the
/// lead go to the earlier offer.
pub fn best_index(metric: Metric, results: &[CalculationResult]) -> Option<usize> {
    if results.len() <= 1 {
        return None;
    }
    let values: Vec<Decimal> = results.iter().map(|r| metric.comparable(r)).collect();
    let first = values[0];
    if values.iter().all(|v| within_tolerance(*v, first)) {
        return None;
    }

    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        let better = match metric.direction() {
            Direction::HigherIsBetter => *v > values[best],
            Direction::LowerIsBetter => *v < values[best],
        };
        if better {
            best = i;
        }
    }
    Some(best)
}

/// Signed, formatted `b − a`: `N/A` when either IRR is undetermined, `--`
/// for a tie, `+` prefixed when positive.
pub fn format_delta(metric: Metric, a: &CalculationResult, b: &CalculationResult) -> String {
    let (Some(va), Some(vb)) = (metric.value(a), metric.value(b)) else {
        return "N/A".to_string();
    };
    if within_tolerance(vb, va) {
        return "--".to_string();
    }
    let diff = vb.saturating_sub(va);
    let sign = if diff > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{}", metric.format_difference(diff))
}

/// Build the comparison grid over `results` in their given order.
pub fn compare_results(results: &[CalculationResult]) -> ComparisonTable {
    let pair = match results {
        [a, b] => Some((a, b)),
        _ => None,
    };

    let rows = Metric::ALL
        .iter()
        .map(|&metric| ComparisonRow {
            metric,
            label: metric.label().to_string(),
            highlighted: metric.is_highlighted(),
            direction: metric.direction(),
            values: results.iter().map(|r| metric.value(r)).collect(),
            display: results.iter().map(|r| metric.format(r)).collect(),
            best_index: best_index(metric, results),
            delta: pair.map(|(a, b)| format_delta(metric, a, b)),
        })
        .collect();

    ComparisonTable {
        offer_ids: results.iter().map(|r| r.offer_id.clone()).collect(),
        offer_names: results.iter().map(|r| r.offer_name.clone()).collect(),
        offer_colors: results.iter().map(|r| r.offer_color.clone()).collect(),
        rows,
    }
}
