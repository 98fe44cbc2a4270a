use clap::Args;
use rust_decimal::Decimal;

use startup_planner_core::break_even::{self, BreakEvenInput};

use super::{load_input, required, CommandResult};

/// Arguments for break-even analysis
#[derive(Args)]
pub struct BreakEvenArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Fixed cost for the period
    #[arg(long)]
    pub fixed_cost: Option<Decimal>,

    /// Selling price per unit
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Variable cost per unit
    #[arg(long)]
    pub variable_cost: Option<Decimal>,

    /// Points on the cost/revenue curve
    #[arg(long, default_value_t = 100)]
    pub curve_points: u32,
}

pub fn run_break_even(args: BreakEvenArgs) -> CommandResult {
    let be_input: BreakEvenInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => BreakEvenInput {
            fixed_cost: required(args.fixed_cost, "fixed-cost")?,
            price: required(args.price, "price")?,
            variable_cost: required(args.variable_cost, "variable-cost")?,
            curve_points: args.curve_points,
        },
    };
    let result = break_even::analyze_break_even(&be_input)?;
    Ok(serde_json::to_value(result)?)
}
