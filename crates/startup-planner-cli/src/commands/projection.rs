use clap::Args;
use rust_decimal::Decimal;

use startup_planner_core::projection::cash_flow::{forecast_cash_flow, CashFlowInput};
use startup_planner_core::projection::scenario::{
    compare_scenarios, preset_scenarios, ScenarioComparisonInput,
};

use super::{load_input, required, CommandResult};

/// Arguments for a single cash-flow projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CashFlowArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash on hand at the start
    #[arg(long)]
    pub initial_cash: Option<Decimal>,

    /// Revenue in the first month
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Monthly revenue growth as a fraction (may be negative)
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub growth_rate: Decimal,

    /// Fixed cost per month
    #[arg(long)]
    pub fixed_cost: Option<Decimal>,

    /// Variable cost as a fraction of revenue
    #[arg(long)]
    pub variable_cost_ratio: Option<Decimal>,

    /// Projection horizon in months
    #[arg(long, default_value_t = 24)]
    pub months: u32,
}

/// Arguments for best / base / worst scenario comparison
#[derive(Args)]
pub struct ScenariosArgs {
    /// Path to JSON/YAML input file with named scenarios
    #[arg(long)]
    pub input: Option<String>,

    /// Cash on hand at the start (preset scenarios)
    #[arg(long)]
    pub initial_cash: Option<Decimal>,

    /// Revenue in the first month (preset scenarios)
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Fixed cost per month (preset scenarios)
    #[arg(long)]
    pub fixed_cost: Option<Decimal>,

    #[arg(long, default_value_t = 24)]
    pub months: u32,
}

pub fn run_cash_flow(args: CashFlowArgs) -> CommandResult {
    let cf_input: CashFlowInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => CashFlowInput {
            initial_cash: required(args.initial_cash, "initial-cash")?,
            revenue: required(args.revenue, "revenue")?,
            growth_rate: args.growth_rate,
            fixed_cost: required(args.fixed_cost, "fixed-cost")?,
            variable_cost_ratio: required(args.variable_cost_ratio, "variable-cost-ratio")?,
            months: args.months,
        },
    };
    let result = forecast_cash_flow(&cf_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_scenarios(args: ScenariosArgs) -> CommandResult {
    let sc_input: ScenarioComparisonInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => ScenarioComparisonInput {
            initial_cash: required(args.initial_cash, "initial-cash")?,
            scenarios: preset_scenarios(
                required(args.revenue, "revenue")?,
                required(args.fixed_cost, "fixed-cost")?,
            ),
            months: args.months,
        },
    };
    let result = compare_scenarios(&sc_input)?;
    Ok(serde_json::to_value(result)?)
}
