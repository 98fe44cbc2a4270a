use clap::Args;

use startup_planner_core::kpi::{analyze_kpi, compare_to_targets, KpiAnalysisInput, KpiTargetInput};

use super::{load_input, CommandResult};
use crate::input::table::read_csv;

/// Arguments for KPI trend analysis over a dated CSV
#[derive(Args)]
pub struct KpiArgs {
    /// Path to JSON/YAML input file holding the table (overrides --data)
    #[arg(long)]
    pub input: Option<String>,

    /// CSV with a `date` column and one column per KPI
    #[arg(long)]
    pub data: Option<String>,

    /// KPI column to analyse; the first numeric column when omitted
    #[arg(long)]
    pub kpi: Option<String>,

    /// Periods to look back (typically 1, 3, 6 or 12)
    #[arg(long, default_value_t = 1)]
    pub lag: usize,
}

/// Arguments for comparing the latest actuals with targets
#[derive(Args)]
pub struct KpiTargetsArgs {
    /// Path to JSON/YAML input file holding both tables
    #[arg(long)]
    pub input: Option<String>,

    /// Dated actuals CSV
    #[arg(long)]
    pub actual: Option<String>,

    /// Targets CSV sharing KPI column names; its last row is used
    #[arg(long)]
    pub targets: Option<String>,
}

pub fn run_kpi(args: KpiArgs) -> CommandResult {
    let kpi_input: KpiAnalysisInput = match args.data {
        Some(ref path) => KpiAnalysisInput {
            table: read_csv(path)?,
            kpi: args.kpi,
            lag: args.lag,
        },
        None => load_input(args.input.as_deref())?
            .ok_or("--data <file.csv>, --input <file> or stdin required for KPI analysis")?,
    };
    let result = analyze_kpi(&kpi_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_kpi_targets(args: KpiTargetsArgs) -> CommandResult {
    let target_input: KpiTargetInput = match (args.actual.as_deref(), args.targets.as_deref()) {
        (Some(actual), Some(targets)) => KpiTargetInput {
            actual: read_csv(actual)?,
            targets: read_csv(targets)?,
        },
        (None, None) => load_input(args.input.as_deref())?
            .ok_or("--actual and --targets CSVs, --input <file> or stdin required")?,
        _ => return Err("--actual and --targets must be given together".into()),
    };
    let result = compare_to_targets(&target_input)?;
    Ok(serde_json::to_value(result)?)
}
