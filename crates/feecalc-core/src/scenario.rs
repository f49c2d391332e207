use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Default share count used to convert an exit valuation into a price.
pub const DEFAULT_SHARES_OUTSTANDING: Decimal = dec!(1000000);

/// Longest supported holding period, in years.
pub const MAX_TIME_HORIZON: u32 = 30;

/// How the scenario's exit price is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Exit price entered directly per share
    #[default]
    PerShare,
    /// Exit price derived from a company valuation and share count
    Valuation,
}

/// Shared exit assumptions applied to every offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Capital deployed, before any upfront fees
    pub investment_amount: Money,
    /// Exit price per share (per-share mode)
    pub exit_price_per_share: Money,
    /// Holding period in whole years
    pub time_horizon: u32,
    #[serde(default)]
    pub price_mode: PriceMode,
    /// Company valuation at exit (valuation mode)
    #[serde(default)]
    pub exit_valuation: Money,
    /// Fully diluted shares at exit (valuation mode)
    #[serde(default = "default_shares_outstanding")]
    pub shares_outstanding: Money,
}

fn default_shares_outstanding() -> Money {
    DEFAULT_SHARES_OUTSTANDING
}

impl Scenario {
    /// Per-share mode scenario.
    pub fn new(investment_amount: Money, exit_price_per_share: Money, time_horizon: u32) -> Self {
        Self {
            investment_amount,
            exit_price_per_share,
            time_horizon,
            price_mode: PriceMode::PerShare,
            exit_valuation: Decimal::ZERO,
            shares_outstanding: DEFAULT_SHARES_OUTSTANDING,
        }
    }

    /// Valuation mode scenario.
    pub fn from_valuation(
        investment_amount: Money,
        exit_valuation: Money,
        shares_outstanding: Money,
        time_horizon: u32,
    ) -> Self {
        Self {
            investment_amount,
            exit_price_per_share: Decimal::ZERO,
            time_horizon,
            price_mode: PriceMode::Valuation,
            exit_valuation,
            shares_outstanding,
        }
    }

    /// Exit price per share implied by the price mode. A zero share count
    /// yields a zero price rather than a division fault.
    pub fn exit_price(&self) -> Money {
        match self.price_mode {
            PriceMode::PerShare => self.exit_price_per_share,
            PriceMode::Valuation => self
                .exit_valuation
                .checked_div(self.shares_outstanding)
                .unwrap_or(Decimal::ZERO),
        }
    }

    /// Copy of this scenario with the exit price pinned to `price`.
    pub fn with_exit_price(&self, price: Money) -> Self {
        Self {
            exit_price_per_share: price,
            price_mode: PriceMode::PerShare,
            ..self.clone()
        }
    }
}
