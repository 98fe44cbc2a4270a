use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::{kpi_stat, mean_ratio, share, KpiStat};
use crate::tabular::{parse_decimal_cell, RawTable};
use crate::types::*;
use crate::{PlannerError, PlannerResult};

/// Columns a financial-statement upload must carry.
pub const FINANCIAL_COLUMNS: [&str; 7] = [
    "Date",
    "Revenue",
    "COGS",
    "Operating_Expense",
    "Financial_Expense",
    "Tax",
    "Total_Assets",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReportInput {
    pub table: RawTable,
    /// One-row target table keyed by KPI name
    #[serde(default)]
    pub targets: Option<RawTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub date: NaiveDate,
    pub revenue: Money,
    pub cogs: Money,
    pub operating_expense: Money,
    pub financial_expense: Money,
    pub tax: Money,
    pub total_assets: Money,
    pub short_term_debt: Option<Money>,
    pub long_term_debt: Option<Money>,
    pub equity: Option<Money>,
    pub accounts_receivable: Option<Money>,
    pub inventory: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRow {
    #[serde(flatten)]
    pub record: FinancialRecord,
    pub gross_profit: Money,
    pub operating_profit: Money,
    /// Earnings before tax
    pub ebt: Money,
    pub net_profit: Money,
    pub gross_margin: Rate,
    pub operating_margin: Rate,
    pub net_margin: Rate,
    pub total_debt: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRatio {
    pub name: String,
    /// Mean across rows; absent when the inputs are missing
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiValue {
    pub kpi: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialTargetRow {
    pub kpi: String,
    pub actual: Option<Decimal>,
    pub target: Decimal,
    pub gap: Option<Decimal>,
    /// Uncapped; absent for a zero target or an unknown KPI
    pub achievement_pct: Option<Decimal>,
    pub has_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReport {
    pub rows: Vec<FinancialRow>,
    pub ratios: Vec<NamedRatio>,
    pub kpi_summary: Vec<KpiStat>,
    /// Latest values plus mean ratios, keyed the way target tables name them
    pub actual_kpis: Vec<KpiValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<FinancialTargetRow>>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn load_financial_records(raw: &RawTable) -> PlannerResult<Vec<FinancialRecord>> {
    raw.validate()?;
    raw.require_columns(&FINANCIAL_COLUMNS)?;

    let dates = raw.date_column("Date")?;
    let revenue = raw.required_decimal_column("Revenue")?;
    let cogs = raw.required_decimal_column("COGS")?;
    let opex = raw.required_decimal_column("Operating_Expense")?;
    let finex = raw.required_decimal_column("Financial_Expense")?;
    let tax = raw.required_decimal_column("Tax")?;
    let assets = raw.required_decimal_column("Total_Assets")?;
    let short_debt = raw.optional_decimal_column("Short_Term_Debt")?;
    let long_debt = raw.optional_decimal_column("Long_Term_Debt")?;
    let equity = raw.optional_decimal_column("Equity")?;
    let receivable = raw.optional_decimal_column("Accounts_Receivable")?;
    let inventory = raw.optional_decimal_column("Inventory")?;

    let pick = |col: &Option<Vec<Decimal>>, i: usize| col.as_ref().map(|c| c[i]);

    Ok((0..raw.len())
        .map(|i| FinancialRecord {
            date: dates[i],
            revenue: revenue[i],
            cogs: cogs[i],
            operating_expense: opex[i],
            financial_expense: finex[i],
            tax: tax[i],
            total_assets: assets[i],
            short_term_debt: pick(&short_debt, i),
            long_term_debt: pick(&long_debt, i),
            equity: pick(&equity, i),
            accounts_receivable: pick(&receivable, i),
            inventory: pick(&inventory, i),
        })
        .collect())
}

/// Income-statement cascade per row: gross profit, operating profit, EBT,
/// net profit. Missing debt columns count as zero debt.
pub fn process_financials(records: &[FinancialRecord]) -> Vec<FinancialRow> {
    records
        .iter()
        .map(|r| {
            let gross_profit = r.revenue - r.cogs;
            let operating_profit = gross_profit - r.operating_expense;
            let ebt = operating_profit - r.financial_expense;
            let net_profit = ebt - r.tax;
            FinancialRow {
                record: r.clone(),
                gross_profit,
                operating_profit,
                ebt,
                net_profit,
                gross_margin: share(gross_profit, r.revenue),
                operating_margin: share(operating_profit, r.revenue),
                net_margin: share(net_profit, r.revenue),
                total_debt: r.short_term_debt.unwrap_or(Decimal::ZERO)
                    + r.long_term_debt.unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

/// Mean financial ratios across rows, skipping rows with a zero denominator.
///
/// "Current Ratio" is total assets over short-term debt; the upload carries
/// no current-asset split.
pub fn mean_ratios(rows: &[FinancialRow]) -> Vec<NamedRatio> {
    let has = |f: fn(&FinancialRecord) -> Option<Decimal>| rows.iter().all(|r| f(&r.record).is_some());
    let optional = |present: bool, pairs: Vec<(Decimal, Decimal)>| {
        if present {
            mean_ratio(pairs.into_iter())
        } else {
            None
        }
    };
    let zero = Decimal::ZERO;

    let has_short = has(|r| r.short_term_debt);
    let has_equity = has(|r| r.equity);
    let has_receivable = has(|r| r.accounts_receivable);
    let has_inventory = has(|r| r.inventory);

    vec![
        NamedRatio {
            name: "Current Ratio".into(),
            value: optional(
                has_short,
                rows.iter()
                    .map(|r| (r.record.total_assets, r.record.short_term_debt.unwrap_or(zero)))
                    .collect(),
            ),
        },
        NamedRatio {
            name: "Debt to Equity".into(),
            value: optional(
                has_equity,
                rows.iter()
                    .map(|r| (r.total_debt, r.record.equity.unwrap_or(zero)))
                    .collect(),
            ),
        },
        NamedRatio {
            name: "Debt to Asset".into(),
            value: mean_ratio(rows.iter().map(|r| (r.total_debt, r.record.total_assets))),
        },
        NamedRatio {
            name: "ROA".into(),
            value: mean_ratio(rows.iter().map(|r| (r.net_profit, r.record.total_assets))),
        },
        NamedRatio {
            name: "ROE".into(),
            value: optional(
                has_equity,
                rows.iter()
                    .map(|r| (r.net_profit, r.record.equity.unwrap_or(zero)))
                    .collect(),
            ),
        },
        NamedRatio {
            name: "Asset Turnover".into(),
            value: mean_ratio(rows.iter().map(|r| (r.record.revenue, r.record.total_assets))),
        },
        NamedRatio {
            name: "Receivable Turnover".into(),
            value: optional(
                has_receivable,
                rows.iter()
                    .map(|r| (r.record.revenue, r.record.accounts_receivable.unwrap_or(zero)))
                    .collect(),
            ),
        },
        NamedRatio {
            name: "Inventory Turnover".into(),
            value: optional(
                has_inventory,
                rows.iter()
                    .map(|r| (r.record.cogs, r.record.inventory.unwrap_or(zero)))
                    .collect(),
            ),
        },
    ]
}

pub fn summarize_kpis(rows: &[FinancialRow]) -> Vec<KpiStat> {
    let mut stats = Vec::new();
    let mut push = |name: &str, values: Vec<Decimal>, with_total: bool| {
        if let Some(s) = kpi_stat(name, &values, with_total) {
            stats.push(s);
        }
    };

    push("Revenue", rows.iter().map(|r| r.record.revenue).collect(), true);
    push("Gross_Profit", rows.iter().map(|r| r.gross_profit).collect(), true);
    push("Operating_Profit", rows.iter().map(|r| r.operating_profit).collect(), true);
    push("Net_Profit", rows.iter().map(|r| r.net_profit).collect(), true);
    push("Total_Assets", rows.iter().map(|r| r.record.total_assets).collect(), true);
    push("Total_Debt", rows.iter().map(|r| r.total_debt).collect(), true);
    let equity: Option<Vec<Decimal>> = rows.iter().map(|r| r.record.equity).collect();
    if let Some(equity) = equity {
        push("Equity", equity, true);
    }
    push("Gross_Margin", rows.iter().map(|r| r.gross_margin).collect(), false);
    push("Net_Margin", rows.iter().map(|r| r.net_margin).collect(), false);

    stats
}

/// Last-row values of every numeric series, then the mean ratios with
/// spaces replaced by underscores.
pub fn actual_kpis(raw: &RawTable, rows: &[FinancialRow], ratios: &[NamedRatio]) -> Vec<KpiValue> {
    let mut values: Vec<KpiValue> = Vec::new();
    let mut set = |kpi: &str, value: Decimal| match values.iter_mut().find(|v| v.kpi == kpi) {
        Some(existing) => existing.value = value,
        None => values.push(KpiValue {
            kpi: kpi.to_string(),
            value,
        }),
    };

    if let Some(last_idx) = raw.len().checked_sub(1) {
        for (col, header) in raw.headers.iter().enumerate() {
            let header = header.trim();
            if header == "Date" || !raw.is_numeric_column(col) {
                continue;
            }
            if let Ok(Some(v)) = parse_decimal_cell(raw.cell(last_idx, col)) {
                set(header, v);
            }
        }
    }

    if let Some(last) = rows.last() {
        set("Gross_Profit", last.gross_profit);
        set("Operating_Profit", last.operating_profit);
        set("EBT", last.ebt);
        set("Net_Profit", last.net_profit);
        set("Gross_Margin", last.gross_margin);
        set("Operating_Margin", last.operating_margin);
        set("Net_Margin", last.net_margin);
        set("Total_Debt", last.total_debt);
    }

    for ratio in ratios {
        if let Some(v) = ratio.value {
            set(&ratio.name.replace(' ', "_"), v);
        }
    }

    values
}

/// Compare actual KPIs with the first row of a target table, one entry per
/// target column. Unknown KPIs are kept with `has_data = false`.
pub fn compare_targets(
    actual: &[KpiValue],
    targets: &RawTable,
    warnings: &mut Vec<String>,
) -> PlannerResult<Vec<FinancialTargetRow>> {
    targets.validate()?;
    if targets.is_empty() {
        warnings.push("Target table has no rows.".into());
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(targets.headers.len());
    for (col, header) in targets.headers.iter().enumerate() {
        let kpi = header.trim();
        let raw = targets.cell(0, col);
        let target = match parse_decimal_cell(raw) {
            Ok(Some(t)) => t,
            Ok(None) => {
                warnings.push(format!("{kpi} has no target value; skipped."));
                continue;
            }
            Err(_) => {
                return Err(PlannerError::invalid(
                    format!("{kpi} target"),
                    format!("not a number: '{raw}'"),
                ))
            }
        };

        let row = match actual.iter().find(|v| v.kpi == kpi) {
            Some(a) => FinancialTargetRow {
                kpi: kpi.to_string(),
                actual: Some(a.value),
                target,
                gap: Some(a.value - target),
                achievement_pct: if target.is_zero() {
                    None
                } else {
                    Some(a.value / target * dec!(100))
                },
                has_data: true,
            },
            None => FinancialTargetRow {
                kpi: kpi.to_string(),
                actual: None,
                target,
                gap: None,
                achievement_pct: None,
                has_data: false,
            },
        };
        out.push(row);
    }
    Ok(out)
}

pub fn build_financial_report(
    input: &FinancialReportInput,
) -> PlannerResult<ComputationOutput<FinancialReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let records = load_financial_records(&input.table)?;
    if records.is_empty() {
        return Err(PlannerError::InsufficientData(
            "Financial table has no rows".into(),
        ));
    }

    let rows = process_financials(&records);
    let ratios = mean_ratios(&rows);
    for r in ratios.iter().filter(|r| r.value.is_none()) {
        warnings.push(format!("{} not available from the uploaded columns.", r.name));
    }
    let kpi_summary = summarize_kpis(&rows);
    let actual = actual_kpis(&input.table, &rows, &ratios);

    let targets = match &input.targets {
        Some(t) => Some(compare_targets(&actual, t, &mut warnings)?),
        None => None,
    };
    debug!(rows = rows.len(), kpis = actual.len(), "financial report built");

    let output = FinancialReport {
        rows,
        ratios,
        kpi_summary,
        actual_kpis: actual,
        targets,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Financial Statement Report",
        &serde_json::json!({
            "net_profit": "Revenue - COGS - Operating_Expense - Financial_Expense - Tax",
            "total_debt": "Short_Term_Debt + Long_Term_Debt",
            "current_ratio": "Total_Assets / Short_Term_Debt",
            "ratio_means": "rows with a zero denominator are skipped",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
