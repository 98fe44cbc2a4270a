mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::break_even::BreakEvenArgs;
use commands::kpi::{KpiArgs, KpiTargetsArgs};
use commands::monte_carlo::ProfitSimArgs;
use commands::projection::{CashFlowArgs, ScenariosArgs};
use commands::ratios::FinancialHealthArgs;
use commands::reports::{BusinessReportArgs, FinancialReportArgs};
use commands::strategy::{GrowthArgs, MarketSizeArgs, PmfArgs};
use commands::unit_economics::UnitEconomicsArgs;

/// Financial planning calculations for startups and SMEs
#[derive(Parser)]
#[command(
    name = "spk",
    version,
    about = "Financial planning calculations for startups and SMEs",
    long_about = "A CLI for startup and SME planning with decimal precision. Covers \
                  break-even, profit simulation, financial ratios, unit economics, \
                  cash-flow projection, scenarios, PMF and growth checks, market \
                  sizing, KPI tracking and business / financial reports."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Break-even units and revenue with the cost/revenue curve
    BreakEven(BreakEvenArgs),
    /// Monte Carlo profit simulation
    ProfitSim(ProfitSimArgs),
    /// Financial ratios and four-category health score
    FinancialHealth(FinancialHealthArgs),
    /// LTV, CAC, payback and viability verdict
    UnitEconomics(UnitEconomicsArgs),
    /// Monthly cash-flow projection with runway
    CashFlow(CashFlowArgs),
    /// Compare named growth scenarios
    Scenarios(ScenariosArgs),
    /// Product-market-fit check
    Pmf(PmfArgs),
    /// Growth strategy score
    Growth(GrowthArgs),
    /// TAM / SAM / SOM estimate
    MarketSize(MarketSizeArgs),
    /// KPI trend, period comparison and early warnings
    Kpi(KpiArgs),
    /// Latest KPIs against targets
    KpiTargets(KpiTargetsArgs),
    /// Business performance report from uploaded results
    BusinessReport(BusinessReportArgs),
    /// Financial statement report with mean ratios
    FinancialReport(FinancialReportArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Logs go to stderr so stdout stays machine-readable. `-v` forces debug;
/// otherwise `RUST_LOG` applies, defaulting to warn.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: commands::CommandResult = match cli.command {
        Commands::BreakEven(args) => commands::break_even::run_break_even(args),
        Commands::ProfitSim(args) => commands::monte_carlo::run_profit_sim(args),
        Commands::FinancialHealth(args) => commands::ratios::run_financial_health(args),
        Commands::UnitEconomics(args) => commands::unit_economics::run_unit_economics(args),
        Commands::CashFlow(args) => commands::projection::run_cash_flow(args),
        Commands::Scenarios(args) => commands::projection::run_scenarios(args),
        Commands::Pmf(args) => commands::strategy::run_pmf(args),
        Commands::Growth(args) => commands::strategy::run_growth(args),
        Commands::MarketSize(args) => commands::strategy::run_market_size(args),
        Commands::Kpi(args) => commands::kpi::run_kpi(args),
        Commands::KpiTargets(args) => commands::kpi::run_kpi_targets(args),
        Commands::BusinessReport(args) => commands::reports::run_business_report(args),
        Commands::FinancialReport(args) => commands::reports::run_financial_report(args),
        Commands::Version => {
            println!("spk {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
