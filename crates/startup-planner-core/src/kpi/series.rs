use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::tabular::RawTable;
use crate::types::*;
use crate::{PlannerError, PlannerResult};

/// Header names recognised as the date column.
pub const DATE_COLUMNS: [&str; 2] = ["date", "Date"];

fn default_lag() -> usize {
    1
}

// ---------------------------------------------------------------------------
// KPI table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiColumn {
    pub name: String,
    /// One entry per date; blank cells are `None`
    pub values: Vec<Option<Decimal>>,
}

/// Dated KPI observations, sorted by date, with every numeric column of the
/// uploaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<KpiColumn>,
}

impl KpiTable {
    pub fn from_raw(raw: &RawTable) -> PlannerResult<Self> {
        raw.validate()?;
        let date_col = raw
            .first_column_of(&DATE_COLUMNS)
            .ok_or_else(|| PlannerError::MissingColumn {
                column: "date".into(),
            })?;
        let dates = raw.date_column_at(date_col)?;

        // Stable sort keeps same-day rows in upload order.
        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);

        let mut columns = Vec::new();
        for col in 0..raw.headers.len() {
            if col == date_col || !raw.is_numeric_column(col) {
                continue;
            }
            let values = raw.decimal_column_at(col)?;
            columns.push(KpiColumn {
                name: raw.headers[col].trim().to_string(),
                values: order.iter().map(|&i| values[i]).collect(),
            });
        }

        if columns.is_empty() {
            return Err(PlannerError::InsufficientData(
                "Table has no numeric KPI columns".into(),
            ));
        }

        debug!(rows = dates.len(), kpis = columns.len(), "kpi table loaded");
        Ok(KpiTable {
            dates: order.iter().map(|&i| dates[i]).collect(),
            columns,
        })
    }

    pub fn kpi_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, kpi: &str) -> PlannerResult<&KpiColumn> {
        self.columns
            .iter()
            .find(|c| c.name == kpi)
            .ok_or_else(|| PlannerError::MissingColumn {
                column: kpi.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiAnalysisInput {
    pub table: RawTable,
    /// KPI column to analyse; the first numeric column when omitted
    #[serde(default)]
    pub kpi: Option<String>,
    /// Number of periods to look back (typically 1, 3, 6 or 12)
    #[serde(default = "default_lag")]
    pub lag: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub value: Option<Decimal>,
    pub previous: Option<Decimal>,
    pub absolute_change: Option<Decimal>,
    pub relative_change_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub kpi: String,
    pub latest: Option<Decimal>,
    pub mean: Option<Decimal>,
    pub best: Option<Decimal>,
    pub worst: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    BelowAverage,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiAlert {
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiAnalysis {
    pub kpi: String,
    pub available_kpis: Vec<String>,
    pub lag: usize,
    pub comparison: Vec<ComparisonRow>,
    pub summary: KpiSummary,
    pub alerts: Vec<KpiAlert>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare each observation with the one `lag` rows earlier.
pub fn period_comparison(
    table: &KpiTable,
    kpi: &str,
    lag: usize,
) -> PlannerResult<Vec<ComparisonRow>> {
    if lag == 0 {
        return Err(PlannerError::invalid("lag", "Lag must be at least one period."));
    }
    let column = table.column(kpi)?;

    Ok(table
        .dates
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let value = column.values[i];
            let previous = i.checked_sub(lag).and_then(|j| column.values[j]);
            let absolute_change = match (value, previous) {
                (Some(v), Some(p)) => Some(v - p),
                _ => None,
            };
            let relative_change_pct = match (absolute_change, previous) {
                (Some(change), Some(p)) if !p.is_zero() => Some(change / p * dec!(100)),
                _ => None,
            };
            ComparisonRow {
                date,
                value,
                previous,
                absolute_change,
                relative_change_pct,
            }
        })
        .collect())
}

/// Latest, mean, best (max) and worst (min) of a KPI, ignoring blanks.
pub fn summarize(table: &KpiTable, kpi: &str) -> PlannerResult<KpiSummary> {
    let column = table.column(kpi)?;
    let present: Vec<Decimal> = column.values.iter().flatten().copied().collect();

    let mean = if present.is_empty() {
        None
    } else {
        Some(present.iter().copied().sum::<Decimal>() / Decimal::from(present.len()))
    };

    Ok(KpiSummary {
        kpi: kpi.to_string(),
        latest: column.values.last().copied().flatten(),
        mean,
        best: present.iter().max().copied(),
        worst: present.iter().min().copied(),
    })
}

/// Flags a latest value below the historical mean and a latest
/// period-over-period decline.
pub fn early_warnings(summary: &KpiSummary, comparison: &[ComparisonRow]) -> Vec<KpiAlert> {
    let mut alerts = Vec::new();

    if let (Some(latest), Some(mean)) = (summary.latest, summary.mean) {
        if latest < mean {
            alerts.push(KpiAlert {
                kind: AlertKind::BelowAverage,
                message: format!("{} is below its historical average.", summary.kpi),
            });
        }
    }

    if let Some(change) = comparison.last().and_then(|r| r.relative_change_pct) {
        if change < Decimal::ZERO {
            alerts.push(KpiAlert {
                kind: AlertKind::Declining,
                message: format!(
                    "{} is falling versus the earlier period ({}%).",
                    summary.kpi,
                    change.round_dp(2)
                ),
            });
        }
    }

    alerts
}

pub fn analyze_kpi(input: &KpiAnalysisInput) -> PlannerResult<ComputationOutput<KpiAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let table = KpiTable::from_raw(&input.table)?;
    let available_kpis = table.kpi_names();
    let kpi = match &input.kpi {
        Some(k) => k.clone(),
        None => available_kpis[0].clone(),
    };

    if input.lag >= table.len() {
        warnings.push(format!(
            "Only {} periods of data; a {}-period comparison has no earlier values.",
            table.len(),
            input.lag
        ));
    }

    let comparison = period_comparison(&table, &kpi, input.lag)?;
    let summary = summarize(&table, &kpi)?;
    let alerts = early_warnings(&summary, &comparison);

    let output = KpiAnalysis {
        kpi,
        available_kpis,
        lag: input.lag,
        comparison,
        summary,
        alerts,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "KPI Period Comparison & Early Warning",
        &serde_json::json!({
            "rows": table.len(),
            "lag": input.lag,
            "relative_change": "absent when the earlier value is missing or zero",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
