use chrono::Local;
use clap::{Args, ValueEnum};
use std::fs;
use tracing::info;

use startup_planner_core::reports::business::Period;
use startup_planner_core::reports::{
    build_business_report, build_financial_report, render_markdown, BusinessReportInput,
    FinancialReportInput, MarkdownReport,
};

use super::{load_input, CommandResult};
use crate::input::table::{read_csv, read_optional_csv};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Monthly,
    Yearly,
}

impl From<PeriodArg> for Period {
    fn from(p: PeriodArg) -> Self {
        match p {
            PeriodArg::Monthly => Period::Monthly,
            PeriodArg::Yearly => Period::Yearly,
        }
    }
}

/// Arguments for the business performance report
#[derive(Args)]
pub struct BusinessReportArgs {
    /// Path to JSON/YAML input file (overrides --data)
    #[arg(long)]
    pub input: Option<String>,

    /// CSV with Date, Revenue, COGS, Operating_Cost, Marketing_Cost,
    /// Other_Cost and optionally Cash_Balance
    #[arg(long)]
    pub data: Option<String>,

    /// Aggregation period
    #[arg(long, value_enum, default_value = "monthly")]
    pub period: PeriodArg,

    /// Optional KPI targets CSV; its last row is used
    #[arg(long)]
    pub targets: Option<String>,

    /// Write the Markdown report to this path
    #[arg(long)]
    pub report: Option<String>,
}

/// Arguments for the financial statement report
#[derive(Args)]
pub struct FinancialReportArgs {
    /// Path to JSON/YAML input file (overrides --data)
    #[arg(long)]
    pub input: Option<String>,

    /// CSV with Date, Revenue, COGS, Operating_Expense, Financial_Expense,
    /// Tax, Total_Assets and optional balance-sheet columns
    #[arg(long)]
    pub data: Option<String>,

    /// Optional one-row KPI targets CSV
    #[arg(long)]
    pub targets: Option<String>,

    /// Write the Markdown report to this path
    #[arg(long)]
    pub report: Option<String>,
}

pub fn run_business_report(args: BusinessReportArgs) -> CommandResult {
    let report_input: BusinessReportInput = match args.data {
        Some(ref path) => BusinessReportInput {
            table: read_csv(path)?,
            period: args.period.into(),
            targets: read_optional_csv(args.targets.as_deref())?,
        },
        None => load_input(args.input.as_deref())?
            .ok_or("--data <file.csv>, --input <file> or stdin required for the business report")?,
    };
    let output = build_business_report(&report_input)?;
    if let Some(ref path) = args.report {
        write_report(&output.result, path)?;
    }
    Ok(serde_json::to_value(output)?)
}

pub fn run_financial_report(args: FinancialReportArgs) -> CommandResult {
    let report_input: FinancialReportInput = match args.data {
        Some(ref path) => FinancialReportInput {
            table: read_csv(path)?,
            targets: read_optional_csv(args.targets.as_deref())?,
        },
        None => load_input(args.input.as_deref())?
            .ok_or("--data <file.csv>, --input <file> or stdin required for the financial report")?,
    };
    let output = build_financial_report(&report_input)?;
    if let Some(ref path) = args.report {
        write_report(&output.result, path)?;
    }
    Ok(serde_json::to_value(output)?)
}

fn write_report<R: MarkdownReport>(report: &R, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = render_markdown(report, Local::now().naive_local());
    fs::write(path, &artifact.bytes)
        .map_err(|e| format!("Failed to write '{}': {}", path, e))?;
    info!(path, bytes = artifact.bytes.len(), "report written");
    Ok(())
}
