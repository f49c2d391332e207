use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::fees::{
    annual_admin_fee, annual_management_fee, european_carry, fee_schedule, upfront_fees,
    CarryTerms, CarryWaterfall, UpfrontFees, YearFees,
};
use crate::offer::Offer;
use crate::scenario::Scenario;
use crate::time_value::{bisect_monotone, solve_irr};
use crate::types::*;

/// Break-even search bracket is `[0, BREAK_EVEN_PRICE_MULTIPLE × price]`.
const BREAK_EVEN_PRICE_MULTIPLE: Decimal = dec!(20);
/// Net return within this many currency units counts as break-even.
const BREAK_EVEN_TOLERANCE: Money = dec!(0.01);
const BREAK_EVEN_ITERATIONS: u32 = 100;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Where the fees went, in currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub setup_fee: Money,
    pub placement_fee: Money,
    /// Management fees summed over the holding period
    pub total_management_fees: Money,
    /// Admin fees summed over the holding period
    pub total_admin_fees: Money,
    pub carry: Money,
}

/// Full outcome of one offer under one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub offer_id: String,
    pub offer_name: String,
    pub offer_color: String,
    pub shares_acquired: Decimal,
    /// Setup plus placement fees
    pub upfront_fees: Money,
    /// Investment plus upfront fees
    pub total_cash_outlay: Money,
    pub gross_exit_value: Money,
    /// Gross exit value less the investment
    pub gross_profit: Money,
    pub gross_moic: Multiple,
    /// Exit value after recurring fees and carry
    pub net_exit_value: Money,
    /// Net exit value less total cash outlay
    pub net_return: Money,
    pub net_moic: Multiple,
    /// `None` when the cash flows have no determinable IRR
    pub net_irr: Option<Rate>,
    pub total_fees: Money,
    /// Total fees as a share of gross profit (0 without profit)
    pub effective_fee_rate: Rate,
    /// Exit price at which net return is zero
    pub break_even_price: Money,
    pub fee_breakdown: FeeBreakdown,
}

/// The three figures tracked across a sensitivity sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedResult {
    pub net_return: Money,
    pub net_moic: Multiple,
    pub net_irr: Option<Rate>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Sum that pins at the Decimal range rather than overflowing.
fn saturating_sum(values: impl IntoIterator<Item = Money>) -> Money {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Everything except IRR and break-even, at an explicit exit price.
struct CoreFigures {
    shares_acquired: Decimal,
    upfront: UpfrontFees,
    total_cash_outlay: Money,
    gross_exit_value: Money,
    gross_profit: Money,
    schedule: Vec<YearFees>,
    total_management_fees: Money,
    total_admin_fees: Money,
    waterfall: CarryWaterfall,
    net_exit_value: Money,
    net_return: Money,
}

impl CoreFigures {
    fn compute(scenario: &Scenario, offer: &Offer, exit_price: Money) -> Self {
        let investment = scenario.investment_amount;
        let horizon = scenario.time_horizon;

        let shares_acquired = investment
            .checked_div(offer.price_per_share)
            .unwrap_or(Decimal::ZERO);
        let upfront = upfront_fees(offer, investment);
        let total_cash_outlay = investment.saturating_add(upfront.total());
        let gross_exit_value = shares_acquired.saturating_mul(exit_price);

        let schedule = fee_schedule(offer, investment, gross_exit_value, horizon);
        let total_management_fees = saturating_sum(schedule.iter().map(|y| y.management_fee));
        let total_admin_fees = saturating_sum(schedule.iter().map(|y| y.admin_fee));

        let gross_profit = gross_exit_value.saturating_sub(investment);
        let gross_multiple = gross_exit_value
            .checked_div(investment)
            .unwrap_or(Decimal::ZERO);
        let terms = CarryTerms {
            carry_rate: offer.carry_rate_at(gross_multiple),
            hurdle_rate: offer.hurdle_rate,
            catch_up_rate: offer.catch_up_rate,
        };
        let waterfall = european_carry(investment, gross_profit, &terms, horizon);

        let net_exit_value = gross_exit_value
            .saturating_sub(total_management_fees)
            .saturating_sub(total_admin_fees)
            .saturating_sub(waterfall.carry);
        let net_return = net_exit_value.saturating_sub(total_cash_outlay);

        Self {
            shares_acquired,
            upfront,
            total_cash_outlay,
            gross_exit_value,
            gross_profit,
            schedule,
            total_management_fees,
            total_admin_fees,
            waterfall,
            net_exit_value,
            net_return,
        }
    }

    fn multiple_of_outlay(&self, value: Money) -> Multiple {
        if self.total_cash_outlay > Decimal::ZERO {
            value
                .checked_div(self.total_cash_outlay)
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }

    fn total_fees(&self) -> Money {
        saturating_sum([
            self.upfront.total(),
            self.total_management_fees,
            self.total_admin_fees,
            self.waterfall.carry,
        ])
    }

    /// Outlay at t=0, fee drags in interim years, and a final flow netting the
    /// last year's fees and carry against the exit proceeds.
    fn cash_flows(&self, offer: &Offer, investment: Money) -> Vec<Money> {
        let mut flows = Vec::with_capacity(self.schedule.len() + 1);
        flows.push(-self.total_cash_outlay);

        let final_year_fees = match self.schedule.split_last() {
            Some((last, interim)) => {
                flows.extend(interim.iter().map(|year| -year.total()));
                last.total()
            }
            None => annual_management_fee(offer, investment, self.gross_exit_value)
                .saturating_add(annual_admin_fee(offer, investment)),
        };

        flows.push(
            self.gross_exit_value
                .saturating_sub(final_year_fees)
                .saturating_sub(self.waterfall.carry),
        );
        flows
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate one offer under a scenario.
///
/// Total on any numeric input: invalid values produce odd numbers, never a
/// fault. Run the validators alongside to flag them.
pub fn evaluate_offer(scenario: &Scenario, offer: &Offer) -> CalculationResult {
    let core = CoreFigures::compute(scenario, offer, scenario.exit_price());
    let net_irr = solve_irr(&core.cash_flows(offer, scenario.investment_amount));
    let total_fees = core.total_fees();
    let effective_fee_rate = if core.gross_profit > Decimal::ZERO {
        total_fees
            .checked_div(core.gross_profit)
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    CalculationResult {
        offer_id: offer.id.clone(),
        offer_name: offer.name.clone(),
        offer_color: offer.color.clone(),
        shares_acquired: core.shares_acquired,
        upfront_fees: core.upfront.total(),
        total_cash_outlay: core.total_cash_outlay,
        gross_exit_value: core.gross_exit_value,
        gross_profit: core.gross_profit,
        gross_moic: core.multiple_of_outlay(core.gross_exit_value),
        net_exit_value: core.net_exit_value,
        net_return: core.net_return,
        net_moic: core.multiple_of_outlay(core.net_exit_value),
        net_irr,
        total_fees,
        effective_fee_rate,
        break_even_price: break_even_price(scenario, offer),
        fee_breakdown: FeeBreakdown {
            setup_fee: core.upfront.setup_fee,
            placement_fee: core.upfront.placement_fee,
            total_management_fees: core.total_management_fees,
            total_admin_fees: core.total_admin_fees,
            carry: core.waterfall.carry,
        },
    }
}

/// Net return, net MOIC and net IRR only; skips the break-even search.
pub fn evaluate_reduced(scenario: &Scenario, offer: &Offer) -> ReducedResult {
    let core = CoreFigures::compute(scenario, offer, scenario.exit_price());
    ReducedResult {
        net_return: core.net_return,
        net_moic: core.multiple_of_outlay(core.net_exit_value),
        net_irr: solve_irr(&core.cash_flows(offer, scenario.investment_amount)),
    }
}

/// Net return if the exit happened at `exit_price`.
pub fn net_return_at(scenario: &Scenario, offer: &Offer, exit_price: Money) -> Money {
    CoreFigures::compute(scenario, offer, exit_price).net_return
}

/// Carry waterfall stages for the scenario's exit.
pub fn carry_waterfall(scenario: &Scenario, offer: &Offer) -> CarryWaterfall {
    CoreFigures::compute(scenario, offer, scenario.exit_price()).waterfall
}

/// The periodic cash flows the net IRR is solved on.
pub fn irr_cash_flows(scenario: &Scenario, offer: &Offer) -> Vec<Money> {
    CoreFigures::compute(scenario, offer, scenario.exit_price())
        .cash_flows(offer, scenario.investment_amount)
}

/// Exit price at which net return crosses zero, searched over
/// `[0, 20 × price_per_share]`. Always returns a best-effort price.
pub fn break_even_price(scenario: &Scenario, offer: &Offer) -> Money {
    let high = offer
        .price_per_share
        .saturating_mul(BREAK_EVEN_PRICE_MULTIPLE);
    bisect_monotone(
        |price| net_return_at(scenario, offer, price),
        Decimal::ZERO,
        high,
        BREAK_EVEN_TOLERANCE,
        BREAK_EVEN_ITERATIONS,
    )
}
