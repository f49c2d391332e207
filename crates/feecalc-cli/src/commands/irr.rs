use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use feecalc_core::analysis::{self, IrrInput};

use super::amount_arg;
use crate::input;

/// Arguments for a standalone IRR solve
#[derive(Args)]
pub struct IrrArgs {
    /// Path to a JSON/YAML document with `cash_flows`
    #[arg(long)]
    pub input: Option<String>,

    /// Periodic cash flows (comma-separated, e.g. "-100,0,121")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_parser = amount_arg)]
    pub cash_flows: Option<Vec<Decimal>>,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr_input: IrrInput = match input::read_document(args.input.as_deref())? {
        Some(doc) => serde_json::from_value(doc)?,
        None => IrrInput {
            cash_flows: args
                .cash_flows
                .ok_or("--cash-flows is required (or provide --input)")?,
        },
    };

    let result = analysis::solve_irr(&irr_input)?;
    Ok(serde_json::to_value(result)?)
}
