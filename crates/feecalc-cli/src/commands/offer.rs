use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use feecalc_core::analysis::{self, EvaluateInput};
use feecalc_core::defaults::{default_offer, default_scenario, offer_name_for_position};
use feecalc_core::offer::palette_color;
use feecalc_core::{FeeAmount, ManagementFeeBasis, Offer, PriceMode, Scenario};

use super::{amount_arg, fee_arg, rate_arg};
use crate::input;

/// Scenario overrides shared by the analysis commands
#[derive(Args, Debug, Default)]
pub struct ScenarioArgs {
    /// Capital deployed, e.g. 100000 or 100k
    #[arg(long, value_parser = amount_arg)]
    pub investment: Option<Decimal>,

    /// Exit price per share
    #[arg(long, value_parser = amount_arg)]
    pub exit_price: Option<Decimal>,

    /// Company valuation at exit (switches to valuation mode)
    #[arg(long, value_parser = amount_arg)]
    pub exit_valuation: Option<Decimal>,

    /// Fully diluted shares at exit (valuation mode)
    #[arg(long, value_parser = amount_arg)]
    pub shares_outstanding: Option<Decimal>,

    /// Holding period in years
    #[arg(long)]
    pub years: Option<u32>,
}

impl ScenarioArgs {
    pub fn apply(&self, scenario: &mut Scenario) {
        if let Some(investment) = self.investment {
            scenario.investment_amount = investment;
        }
        if let Some(price) = self.exit_price {
            scenario.exit_price_per_share = price;
            scenario.price_mode = PriceMode::PerShare;
        }
        if let Some(valuation) = self.exit_valuation {
            scenario.exit_valuation = valuation;
            scenario.price_mode = PriceMode::Valuation;
        }
        if let Some(shares) = self.shares_outstanding {
            scenario.shares_outstanding = shares;
        }
        if let Some(years) = self.years {
            scenario.time_horizon = years;
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FeeBasisArg {
    Committed,
    Invested,
    Nav,
}

impl From<FeeBasisArg> for ManagementFeeBasis {
    fn from(arg: FeeBasisArg) -> Self {
        match arg {
            FeeBasisArg::Committed => ManagementFeeBasis::CommittedCapital,
            FeeBasisArg::Invested => ManagementFeeBasis::InvestedCapital,
            FeeBasisArg::Nav => ManagementFeeBasis::NetAssetValue,
        }
    }
}

/// Arguments for single-offer evaluation
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to a JSON/YAML document with `scenario` and `offer`
    /// (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Offer display name
    #[arg(long)]
    pub name: Option<String>,

    /// Entry price per share
    #[arg(long, value_parser = amount_arg)]
    pub price: Option<Decimal>,

    /// Annual management fee rate, e.g. 2% or 0.02
    #[arg(long, value_parser = rate_arg)]
    pub mgmt_fee: Option<Decimal>,

    /// Capital base for the management fee
    #[arg(long, value_enum)]
    pub fee_basis: Option<FeeBasisArg>,

    /// Carried interest rate
    #[arg(long, value_parser = rate_arg)]
    pub carry: Option<Decimal>,

    /// Annually compounding hurdle rate
    #[arg(long, value_parser = rate_arg)]
    pub hurdle: Option<Decimal>,

    /// GP catch-up rate above the hurdle
    #[arg(long, value_parser = rate_arg)]
    pub catch_up: Option<Decimal>,

    /// One-time setup fee: flat (5000) or share of investment (1%)
    #[arg(long, value_parser = fee_arg)]
    pub setup_fee: Option<FeeAmount>,

    /// One-time placement fee rate
    #[arg(long, value_parser = rate_arg)]
    pub placement_fee: Option<Decimal>,

    /// Annual admin fee: flat (500) or share of investment (0.25%)
    #[arg(long, value_parser = fee_arg)]
    pub admin_fee: Option<FeeAmount>,
}

impl EvaluateArgs {
    fn offer(&self) -> Offer {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| offer_name_for_position(0));
        let mut offer = default_offer("offer-1", &name, palette_color(0));
        if let Some(price) = self.price {
            offer.price_per_share = price;
        }
        if let Some(rate) = self.mgmt_fee {
            offer.management_fee_rate = rate;
        }
        if let Some(basis) = self.fee_basis {
            offer.management_fee_basis = basis.into();
        }
        if let Some(rate) = self.carry {
            offer.carry_rate = rate;
        }
        if let Some(rate) = self.hurdle {
            offer.hurdle_rate = rate;
        }
        if let Some(rate) = self.catch_up {
            offer.catch_up_rate = rate;
        }
        if let Some(fee) = self.setup_fee {
            offer.setup_fee = fee;
        }
        if let Some(rate) = self.placement_fee {
            offer.placement_fee_rate = rate;
        }
        if let Some(fee) = self.admin_fee {
            offer.admin_fee = fee;
        }
        offer
    }
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let evaluate_input: EvaluateInput = match input::read_document(args.input.as_deref())? {
        Some(doc) => serde_json::from_value(doc)?,
        None => {
            let mut scenario = default_scenario();
            args.scenario.apply(&mut scenario);
            EvaluateInput {
                scenario,
                offer: args.offer(),
            }
        }
    };

    let result = analysis::evaluate(&evaluate_input);
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_overrides() {
        let mut scenario = default_scenario();
        let args = ScenarioArgs {
            exit_valuation: Some(Decimal::from(450_000_000)),
            years: Some(5),
            ..ScenarioArgs::default()
        };
        args.apply(&mut scenario);
        assert_eq!(scenario.price_mode, PriceMode::Valuation);
        assert_eq!(scenario.exit_price(), Decimal::from(450));
        assert_eq!(scenario.time_horizon, 5);
    }
}
