use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::series::{KpiTable, DATE_COLUMNS};
use crate::tabular::{parse_decimal_cell, RawTable};
use crate::types::*;
use crate::{PlannerError, PlannerResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiTargetInput {
    /// Dated actuals, same layout as for KPI tracking
    pub actual: RawTable,
    /// Target table sharing KPI column names; its last row holds the targets
    pub targets: RawTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTargetRow {
    pub kpi: String,
    pub actual: Decimal,
    pub target: Decimal,
    /// Actual minus target; negative means short of target
    pub gap: Decimal,
    /// Share of target reached, capped at 100
    pub achievement_pct: Option<Decimal>,
    pub achieved: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetComparison {
    pub common_kpis: Vec<String>,
    pub rows: Vec<KpiTargetRow>,
}

pub fn target_row(kpi: &str, actual: Decimal, target: Decimal) -> KpiTargetRow {
    let achievement_pct = if target.is_zero() {
        None
    } else {
        Some((actual / target * dec!(100)).min(dec!(100)))
    };
    let achieved = actual.min(target);
    KpiTargetRow {
        kpi: kpi.to_string(),
        actual,
        target,
        gap: actual - target,
        achievement_pct,
        achieved,
        remaining: target - achieved,
    }
}

/// Compare each KPI's latest actual with the target table's last row.
///
/// Only KPIs that are numeric in the actuals and present in the targets are
/// compared, in actual-column order.
pub fn compare_to_targets(
    input: &KpiTargetInput,
) -> PlannerResult<ComputationOutput<TargetComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let actual = KpiTable::from_raw(&input.actual)?;
    input.targets.validate()?;
    let target_row_idx = input
        .targets
        .len()
        .checked_sub(1)
        .ok_or_else(|| PlannerError::InsufficientData("Target table has no rows".into()))?;

    let common_kpis: Vec<String> = actual
        .columns
        .iter()
        .map(|c| c.name.clone())
        .filter(|name| !DATE_COLUMNS.contains(&name.as_str()) && input.targets.has_column(name))
        .collect();

    if common_kpis.is_empty() {
        warnings.push("No KPI columns in common between actuals and targets.".into());
    }

    let mut rows = Vec::with_capacity(common_kpis.len());
    for kpi in &common_kpis {
        let col = input.targets.require_column(kpi)?;
        let raw = input.targets.cell(target_row_idx, col);
        let target = parse_decimal_cell(raw).map_err(|_| {
            PlannerError::invalid(format!("{kpi} target"), format!("not a number: '{raw}'"))
        })?;
        let latest = actual.column(kpi)?.values.last().copied().flatten();

        match (latest, target) {
            (Some(a), Some(t)) => {
                if t.is_zero() {
                    warnings.push(format!("Target for {kpi} is zero; achievement is undefined."));
                }
                rows.push(target_row(kpi, a, t));
            }
            (None, _) => warnings.push(format!("{kpi} has no latest actual value; skipped.")),
            (_, None) => warnings.push(format!("{kpi} has no target value; skipped.")),
        }
    }

    let output = TargetComparison { common_kpis, rows };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "KPI vs Target",
        &serde_json::json!({
            "actual": "latest row of the dated actuals",
            "target": "last row of the target table",
            "achievement_pct": "min(actual / target * 100, 100)",
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_target_row_caps_achievement() {
        let over = target_row("revenue", dec!(150), dec!(100));
        assert_eq!(over.achievement_pct, Some(dec!(100)));
        assert_eq!(over.achieved, dec!(100));
        assert_eq!(over.remaining, Decimal::ZERO);
        assert_eq!(over.gap, dec!(50));

        let under = target_row("revenue", dec!(80), dec!(100));
        assert_eq!(under.achievement_pct, Some(dec!(80)));
        assert_eq!(under.remaining, dec!(20));

        assert_eq!(target_row("x", dec!(5), Decimal::ZERO).achievement_pct, None);
    }

    #[test]
    fn test_compare_common_kpis_in_actual_order() {
        let input = KpiTargetInput {
            actual: raw(
                &["date", "users", "revenue"],
                &[&["2024-01-01", "10", "100"], &["2024-02-01", "40", "90"]],
            ),
            targets: raw(
                &["revenue", "users", "nps"],
                &[&["50", "20", "60"], &["120", "50", "70"]],
            ),
        };
        let out = compare_to_targets(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.common_kpis, vec!["users".to_string(), "revenue".to_string()]);
        assert_eq!(r.rows[0].achievement_pct, Some(dec!(80)));
        assert_eq!(r.rows[1].achievement_pct, Some(dec!(75)));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_no_common_kpi_warns() {
        let input = KpiTargetInput {
            actual: raw(&["date", "users"], &[&["2024-01-01", "10"]]),
            targets: raw(&["revenue"], &[&["100"]]),
        };
        let out = compare_to_targets(&input).unwrap();
        assert!(out.result.rows.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }
}
