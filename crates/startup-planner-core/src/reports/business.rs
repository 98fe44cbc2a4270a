use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

use super::{kpi_stat, mean_ratio, share, KpiStat};
use crate::kpi::targets::{target_row, KpiTargetRow};
use crate::tabular::{parse_decimal_cell, RawTable};
use crate::types::*;
use crate::{PlannerError, PlannerResult};

/// Columns a business-results upload must carry.
pub const BUSINESS_COLUMNS: [&str; 6] = [
    "Date",
    "Revenue",
    "COGS",
    "Operating_Cost",
    "Marketing_Cost",
    "Other_Cost",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Yearly,
}

impl Period {
    fn key(&self, date: NaiveDate) -> String {
        match self {
            Period::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            Period::Yearly => format!("{:04}", date.year()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessReportInput {
    pub table: RawTable,
    #[serde(default)]
    pub period: Period,
    /// Optional KPI targets; the last row is used
    #[serde(default)]
    pub targets: Option<RawTable>,
}

/// One uploaded period of operating results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub date: NaiveDate,
    pub revenue: Money,
    pub cogs: Money,
    pub operating_cost: Money,
    pub marketing_cost: Money,
    pub other_cost: Money,
    pub cash_balance: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRow {
    #[serde(flatten)]
    pub record: BusinessRecord,
    pub total_cost: Money,
    pub gross_profit: Money,
    pub operating_profit: Money,
    pub net_profit: Money,
    pub gross_margin: Rate,
    pub operating_margin: Rate,
    pub net_margin: Rate,
    pub cost_to_revenue: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalMetrics {
    /// First to last row, in percent
    pub revenue_growth_pct: Option<Decimal>,
    pub net_profit_growth_pct: Option<Decimal>,
    pub marketing_to_revenue_pct: Option<Decimal>,
    pub operating_to_revenue_pct: Option<Decimal>,
    /// Mean total cost per row
    pub average_burn: Money,
    /// Last cash balance divided by the average burn
    pub runway_months: Option<RatioValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// "YYYY-MM" or "YYYY"
    pub period: String,
    pub revenue: Money,
    pub total_cost: Money,
    pub net_profit: Money,
    pub net_margin: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessReport {
    pub rows: Vec<BusinessRow>,
    pub kpi_summary: Vec<KpiStat>,
    pub metrics: AdditionalMetrics,
    pub period: Period,
    pub periods: Vec<PeriodTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<KpiTargetRow>>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate an upload against the business-results schema.
pub fn load_business_records(raw: &RawTable) -> PlannerResult<Vec<BusinessRecord>> {
    raw.validate()?;
    raw.require_columns(&BUSINESS_COLUMNS)?;

    let dates = raw.date_column("Date")?;
    let revenue = raw.required_decimal_column("Revenue")?;
    let cogs = raw.required_decimal_column("COGS")?;
    let operating = raw.required_decimal_column("Operating_Cost")?;
    let marketing = raw.required_decimal_column("Marketing_Cost")?;
    let other = raw.required_decimal_column("Other_Cost")?;
    let cash = match raw.column_index("Cash_Balance") {
        Some(col) => Some(raw.decimal_column_at(col)?),
        None => None,
    };

    Ok((0..raw.len())
        .map(|i| BusinessRecord {
            date: dates[i],
            revenue: revenue[i],
            cogs: cogs[i],
            operating_cost: operating[i],
            marketing_cost: marketing[i],
            other_cost: other[i],
            cash_balance: cash.as_ref().and_then(|c| c[i]),
        })
        .collect())
}

/// Derive costs, profits and margins per row. Margins are zero for a
/// zero-revenue row.
pub fn process_business(records: &[BusinessRecord]) -> Vec<BusinessRow> {
    records
        .iter()
        .map(|r| {
            let total_cost = r.cogs + r.operating_cost + r.marketing_cost + r.other_cost;
            let gross_profit = r.revenue - r.cogs;
            let operating_profit = gross_profit - r.operating_cost;
            let net_profit = r.revenue - total_cost;
            BusinessRow {
                record: r.clone(),
                total_cost,
                gross_profit,
                operating_profit,
                net_profit,
                gross_margin: share(gross_profit, r.revenue),
                operating_margin: share(operating_profit, r.revenue),
                net_margin: share(net_profit, r.revenue),
                cost_to_revenue: share(total_cost, r.revenue),
            }
        })
        .collect()
}

pub fn summarize_kpis(rows: &[BusinessRow]) -> Vec<KpiStat> {
    let series: [(&str, fn(&BusinessRow) -> Decimal, bool); 7] = [
        ("Revenue", |r| r.record.revenue, true),
        ("Total_Cost", |r| r.total_cost, true),
        ("Net_Profit", |r| r.net_profit, true),
        ("Gross_Margin", |r| r.gross_margin, false),
        ("Operating_Margin", |r| r.operating_margin, false),
        ("Net_Margin", |r| r.net_margin, false),
        ("Cost_to_Revenue", |r| r.cost_to_revenue, false),
    ];
    series
        .iter()
        .filter_map(|(name, get, with_total)| {
            let values: Vec<Decimal> = rows.iter().map(get).collect();
            kpi_stat(name, &values, *with_total)
        })
        .collect()
}

pub fn additional_metrics(rows: &[BusinessRow]) -> AdditionalMetrics {
    let growth = |first: Decimal, last: Decimal| {
        if first.is_zero() {
            None
        } else {
            Some((last - first) / first * dec!(100))
        }
    };
    let (revenue_growth_pct, net_profit_growth_pct) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (
            growth(first.record.revenue, last.record.revenue),
            growth(first.net_profit, last.net_profit),
        ),
        _ => (None, None),
    };

    let average_burn = super::mean(&rows.iter().map(|r| r.total_cost).collect::<Vec<_>>())
        .unwrap_or(Decimal::ZERO);
    let runway_months = rows
        .last()
        .and_then(|r| r.record.cash_balance)
        .map(|cash| RatioValue::or_infinite(cash, average_burn));

    AdditionalMetrics {
        revenue_growth_pct,
        net_profit_growth_pct,
        marketing_to_revenue_pct: mean_ratio(
            rows.iter().map(|r| (r.record.marketing_cost, r.record.revenue)),
        )
        .map(|v| v * dec!(100)),
        operating_to_revenue_pct: mean_ratio(
            rows.iter().map(|r| (r.record.operating_cost, r.record.revenue)),
        )
        .map(|v| v * dec!(100)),
        average_burn,
        runway_months,
    }
}

/// Sum revenue, cost and profit per calendar month or year, in date order.
pub fn aggregate_by_period(rows: &[BusinessRow], period: Period) -> Vec<PeriodTotals> {
    let mut buckets: BTreeMap<String, (Decimal, Decimal, Decimal)> = BTreeMap::new();
    for r in rows {
        let entry = buckets
            .entry(period.key(r.record.date))
            .or_insert((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        entry.0 += r.record.revenue;
        entry.1 += r.total_cost;
        entry.2 += r.net_profit;
    }
    buckets
        .into_iter()
        .map(|(period, (revenue, total_cost, net_profit))| PeriodTotals {
            period,
            revenue,
            total_cost,
            net_profit,
            net_margin: share(net_profit, revenue),
        })
        .collect()
}

pub fn build_business_report(
    input: &BusinessReportInput,
) -> PlannerResult<ComputationOutput<BusinessReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let records = load_business_records(&input.table)?;
    if records.is_empty() {
        return Err(PlannerError::InsufficientData(
            "Business table has no rows".into(),
        ));
    }

    let rows = process_business(&records);
    let zero_revenue = rows.iter().filter(|r| r.record.revenue.is_zero()).count();
    if zero_revenue > 0 {
        warnings.push(format!(
            "{zero_revenue} row(s) with zero revenue; their margins are reported as 0."
        ));
    }

    let kpi_summary = summarize_kpis(&rows);
    let metrics = additional_metrics(&rows);
    let periods = aggregate_by_period(&rows, input.period);

    let targets = match &input.targets {
        Some(t) => Some(compare_latest(&rows, t, &mut warnings)?),
        None => None,
    };
    debug!(rows = rows.len(), periods = periods.len(), "business report built");

    let output = BusinessReport {
        rows,
        kpi_summary,
        metrics,
        period: input.period,
        periods,
        targets,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Business Performance Report",
        &serde_json::json!({
            "total_cost": "COGS + Operating_Cost + Marketing_Cost + Other_Cost",
            "burn": "mean total cost per row",
            "runway": "last Cash_Balance / burn",
            "period": input.period,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Latest value of every numeric series a target table may reference.
fn latest_values(rows: &[BusinessRow]) -> Vec<(&'static str, Decimal)> {
    let Some(last) = rows.last() else {
        return Vec::new();
    };
    let mut values = vec![
        ("Revenue", last.record.revenue),
        ("COGS", last.record.cogs),
        ("Operating_Cost", last.record.operating_cost),
        ("Marketing_Cost", last.record.marketing_cost),
        ("Other_Cost", last.record.other_cost),
    ];
    if let Some(cash) = last.record.cash_balance {
        values.push(("Cash_Balance", cash));
    }
    values.extend([
        ("Total_Cost", last.total_cost),
        ("Gross_Profit", last.gross_profit),
        ("Operating_Profit", last.operating_profit),
        ("Net_Profit", last.net_profit),
        ("Gross_Margin", last.gross_margin),
        ("Operating_Margin", last.operating_margin),
        ("Net_Margin", last.net_margin),
        ("Cost_to_Revenue", last.cost_to_revenue),
    ]);
    values
}

fn compare_latest(
    rows: &[BusinessRow],
    targets: &RawTable,
    warnings: &mut Vec<String>,
) -> PlannerResult<Vec<KpiTargetRow>> {
    targets.validate()?;
    let Some(last) = targets.len().checked_sub(1) else {
        warnings.push("Target table has no rows.".into());
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for (kpi, actual) in latest_values(rows) {
        let Some(col) = targets.column_index(kpi) else {
            continue;
        };
        let raw = targets.cell(last, col);
        match parse_decimal_cell(raw) {
            Ok(Some(target)) => out.push(target_row(kpi, actual, target)),
            Ok(None) => warnings.push(format!("{kpi} has no target value; skipped.")),
            Err(_) => {
                return Err(PlannerError::invalid(
                    format!("{kpi} target"),
                    format!("not a number: '{raw}'"),
                ))
            }
        }
    }
    if out.is_empty() {
        warnings.push("No KPI columns in common with the target table.".into());
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
