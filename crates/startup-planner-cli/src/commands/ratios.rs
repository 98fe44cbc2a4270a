use clap::Args;
use rust_decimal::Decimal;

use startup_planner_core::ratios::statement::{
    self, BalanceSheet, FinancialStatementInputs,
};

use super::{load_input, required, CommandResult};

/// Arguments for financial ratio analysis and health scoring
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FinancialHealthArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Cost of goods sold
    #[arg(long)]
    pub cogs: Option<Decimal>,

    #[arg(long)]
    pub operating_cost: Option<Decimal>,

    /// Total cost; COGS plus operating cost when omitted
    #[arg(long)]
    pub total_cost: Option<Decimal>,

    /// Net profit (may be negative); revenue minus total cost when omitted
    #[arg(long)]
    pub net_profit: Option<Decimal>,

    #[arg(long)]
    pub total_assets: Option<Decimal>,

    #[arg(long)]
    pub equity: Option<Decimal>,

    #[arg(long)]
    pub current_assets: Option<Decimal>,

    #[arg(long)]
    pub current_liabilities: Option<Decimal>,

    /// Cash and equivalents
    #[arg(long)]
    pub cash: Option<Decimal>,

    #[arg(long)]
    pub total_debt: Option<Decimal>,
}

pub fn run_financial_health(args: FinancialHealthArgs) -> CommandResult {
    let inputs: FinancialStatementInputs = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => {
            let balance_sheet = BalanceSheet {
                total_assets: required(args.total_assets, "total-assets")?,
                equity: required(args.equity, "equity")?,
                current_assets: required(args.current_assets, "current-assets")?,
                current_liabilities: required(args.current_liabilities, "current-liabilities")?,
                cash: required(args.cash, "cash")?,
                total_debt: required(args.total_debt, "total-debt")?,
            };
            let mut inputs = FinancialStatementInputs::from_operations(
                required(args.revenue, "revenue")?,
                required(args.cogs, "cogs")?,
                required(args.operating_cost, "operating-cost")?,
                balance_sheet,
            );
            if let Some(total_cost) = args.total_cost {
                inputs.total_cost = total_cost;
                inputs.net_profit = inputs.revenue - total_cost;
            }
            if let Some(net_profit) = args.net_profit {
                inputs.net_profit = net_profit;
            }
            inputs
        }
    };

    let result = statement::analyze_financial_health(&inputs)?;
    Ok(serde_json::to_value(result)?)
}
