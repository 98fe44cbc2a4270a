use clap::Args;
use rust_decimal::Decimal;

use startup_planner_core::strategy::growth::{analyze_growth, GrowthInput};
use startup_planner_core::strategy::market_size::{estimate_market_size, MarketSizeInput};
use startup_planner_core::strategy::pmf::{analyze_pmf, PmfInput};

use super::{load_input, required, CommandResult};

/// Arguments for the product-market-fit check. Shares are fractions in [0, 1].
#[derive(Args)]
pub struct PmfArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub retention_90d: Option<Decimal>,

    #[arg(long)]
    pub repeat_usage: Option<Decimal>,

    /// Share of "very disappointed" survey answers
    #[arg(long)]
    pub very_disappointed: Option<Decimal>,

    #[arg(long)]
    pub somewhat_disappointed: Option<Decimal>,

    #[arg(long)]
    pub organic_revenue_growth: Option<Decimal>,

    #[arg(long, alias = "ltv-cac")]
    pub ltv_cac_ratio: Option<Decimal>,
}

/// Arguments for growth-strategy scoring
#[derive(Args)]
pub struct GrowthArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub revenue_growth_rate: Option<Decimal>,

    #[arg(long)]
    pub organic_ratio: Option<Decimal>,

    #[arg(long)]
    pub cac_growth_rate: Option<Decimal>,

    /// 0 = no pressure from burn, 1 = severe
    #[arg(long)]
    pub burn_rate_pressure: Option<Decimal>,
}

/// Arguments for TAM / SAM / SOM sizing
#[derive(Args)]
pub struct MarketSizeArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Potential customers in the total market
    #[arg(long)]
    pub total_customers: Option<Decimal>,

    /// Annual revenue per customer
    #[arg(long)]
    pub arpu: Option<Decimal>,

    #[arg(long, default_value = "0.3")]
    pub sam_ratio: Decimal,

    #[arg(long, default_value = "0.1")]
    pub som_ratio: Decimal,
}

pub fn run_pmf(args: PmfArgs) -> CommandResult {
    let pmf_input: PmfInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => PmfInput {
            retention_90d: required(args.retention_90d, "retention-90d")?,
            repeat_usage: required(args.repeat_usage, "repeat-usage")?,
            very_disappointed: required(args.very_disappointed, "very-disappointed")?,
            somewhat_disappointed: required(args.somewhat_disappointed, "somewhat-disappointed")?,
            organic_revenue_growth: required(args.organic_revenue_growth, "organic-revenue-growth")?,
            ltv_cac_ratio: required(args.ltv_cac_ratio, "ltv-cac-ratio")?,
        },
    };
    let result = analyze_pmf(&pmf_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_growth(args: GrowthArgs) -> CommandResult {
    let growth_input: GrowthInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => GrowthInput {
            revenue_growth_rate: required(args.revenue_growth_rate, "revenue-growth-rate")?,
            organic_ratio: required(args.organic_ratio, "organic-ratio")?,
            cac_growth_rate: required(args.cac_growth_rate, "cac-growth-rate")?,
            burn_rate_pressure: required(args.burn_rate_pressure, "burn-rate-pressure")?,
        },
    };
    let result = analyze_growth(&growth_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_market_size(args: MarketSizeArgs) -> CommandResult {
    let ms_input: MarketSizeInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => MarketSizeInput {
            total_customers: required(args.total_customers, "total-customers")?,
            arpu: required(args.arpu, "arpu")?,
            sam_ratio: args.sam_ratio,
            som_ratio: args.som_ratio,
        },
    };
    let result = estimate_market_size(&ms_input)?;
    Ok(serde_json::to_value(result)?)
}
