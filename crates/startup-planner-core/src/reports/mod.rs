pub mod artifact;
pub mod business;
pub mod financial;

pub use artifact::{render_markdown, MarkdownReport, ReportArtifact};
pub use business::{build_business_report, BusinessReportInput};
pub use financial::{build_financial_report, FinancialReportInput};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate statistics for one report KPI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiStat {
    pub kpi: String,
    /// Omitted for margins and ratios, where a sum has no meaning
    pub total: Option<Decimal>,
    pub mean: Decimal,
    pub max: Decimal,
    pub min: Decimal,
}

pub(crate) fn kpi_stat(kpi: &str, values: &[Decimal], with_total: bool) -> Option<KpiStat> {
    Some(KpiStat {
        kpi: kpi.to_string(),
        total: with_total.then(|| values.iter().copied().sum()),
        mean: mean(values)?,
        max: values.iter().max().copied()?,
        min: values.iter().min().copied()?,
    })
}

pub(crate) fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().copied().sum::<Decimal>() / Decimal::from(values.len()))
    }
}

/// `numerator / denominator`, or zero for a zero denominator.
pub(crate) fn share(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Mean of `numerator / denominator` over rows whose denominator is non-zero.
pub(crate) fn mean_ratio(pairs: impl Iterator<Item = (Decimal, Decimal)>) -> Option<Decimal> {
    let ratios: Vec<Decimal> = pairs
        .filter(|(_, d)| !d.is_zero())
        .map(|(n, d)| n / d)
        .collect();
    mean(&ratios)
}
