use clap::Args;
use rust_decimal::Decimal;

use startup_planner_core::unit_economics::metrics::{self, UnitEconomicsInput};

use super::{load_input, required, CommandResult};

/// Arguments for LTV / CAC / payback analysis
#[derive(Args)]
pub struct UnitEconomicsArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly revenue per customer
    #[arg(long)]
    pub arpu: Option<Decimal>,

    /// Customer acquisition cost
    #[arg(long)]
    pub cac: Option<Decimal>,

    /// Monthly churn as a fraction (0.05 = 5%)
    #[arg(long)]
    pub churn: Option<Decimal>,

    /// Gross margin as a fraction
    #[arg(long)]
    pub gross_margin: Option<Decimal>,
}

pub fn run_unit_economics(args: UnitEconomicsArgs) -> CommandResult {
    let ue_input: UnitEconomicsInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => UnitEconomicsInput {
            arpu: required(args.arpu, "arpu")?,
            cac: required(args.cac, "cac")?,
            churn: required(args.churn, "churn")?,
            gross_margin: required(args.gross_margin, "gross-margin")?,
        },
    };
    let result = metrics::analyze_unit_economics(&ue_input)?;
    Ok(serde_json::to_value(result)?)
}
