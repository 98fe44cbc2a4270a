use clap::Args;
use rust_decimal::Decimal;

use startup_planner_core::break_even::{default_profit_simulation, BreakEvenInput};
use startup_planner_core::monte_carlo::{run_profit_simulation, ProfitSimulationInput};

use super::{load_input, required, CommandResult};

/// Arguments for the Monte Carlo profit simulation
#[derive(Args)]
pub struct ProfitSimArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub price_mean: Option<f64>,

    #[arg(long, default_value_t = 0.0)]
    pub price_std: f64,

    #[arg(long)]
    pub demand_mean: Option<f64>,

    #[arg(long, default_value_t = 0.0)]
    pub demand_std: f64,

    #[arg(long)]
    pub fixed_cost: Option<f64>,

    /// Variable cost per unit
    #[arg(long)]
    pub variable_cost: Option<f64>,

    /// Number of draws
    #[arg(long, short = 'n', default_value_t = 1000)]
    pub simulations: u32,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Include the sorted profit samples in the output
    #[arg(long)]
    pub samples: bool,

    /// Derive the distributions from a break-even setup: price at
    /// --price, demand centred on the break-even volume
    #[arg(long)]
    pub from_break_even: bool,

    /// Selling price, used with --from-break-even
    #[arg(long)]
    pub price: Option<Decimal>,
}

pub fn run_profit_sim(args: ProfitSimArgs) -> CommandResult {
    let sim_input: ProfitSimulationInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None if args.from_break_even => {
            let be = BreakEvenInput {
                fixed_cost: decimal(required(args.fixed_cost, "fixed-cost")?)?,
                price: required(args.price, "price")?,
                variable_cost: decimal(required(args.variable_cost, "variable-cost")?)?,
                curve_points: 2,
            };
            let mut input = default_profit_simulation(&be, args.simulations, args.seed);
            input.include_samples = args.samples;
            input
        }
        None => ProfitSimulationInput {
            price_mean: required(args.price_mean, "price-mean")?,
            price_std: args.price_std,
            demand_mean: required(args.demand_mean, "demand-mean")?,
            demand_std: args.demand_std,
            fixed_cost: required(args.fixed_cost, "fixed-cost")?,
            variable_cost: required(args.variable_cost, "variable-cost")?,
            num_simulations: args.simulations,
            seed: args.seed,
            include_samples: args.samples,
        },
    };
    let result = run_profit_simulation(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}

fn decimal(value: f64) -> Result<Decimal, Box<dyn std::error::Error>> {
    Decimal::try_from(value).map_err(|e| format!("Invalid amount {value}: {e}").into())
}
