use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

use super::health::{assess_health, HealthAssessment};
use crate::types::*;
use crate::{PlannerError, PlannerResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Raw figures from the income statement and balance sheet.
///
/// `total_cost` is taken as given; it is not reconciled against
/// `cogs + operating_cost`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatementInputs {
    pub revenue: Money,
    pub cogs: Money,
    pub operating_cost: Money,
    pub total_cost: Money,
    /// Signed; a loss is negative.
    pub net_profit: Money,
    pub total_assets: Money,
    pub equity: Money,
    pub current_assets: Money,
    pub current_liabilities: Money,
    pub cash: Money,
    pub total_debt: Money,
}

/// Balance-sheet half of [`FinancialStatementInputs`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub total_assets: Money,
    pub equity: Money,
    pub current_assets: Money,
    pub current_liabilities: Money,
    pub cash: Money,
    pub total_debt: Money,
}

impl FinancialStatementInputs {
    /// Build inputs the way an operator usually has them: total cost is
    /// COGS plus operating cost and net profit is what remains of revenue.
    pub fn from_operations(
        revenue: Money,
        cogs: Money,
        operating_cost: Money,
        balance_sheet: BalanceSheet,
    ) -> Self {
        let total_cost = cogs + operating_cost;
        Self {
            revenue,
            cogs,
            operating_cost,
            total_cost,
            net_profit: revenue - total_cost,
            total_assets: balance_sheet.total_assets,
            equity: balance_sheet.equity,
            current_assets: balance_sheet.current_assets,
            current_liabilities: balance_sheet.current_liabilities,
            cash: balance_sheet.cash,
            total_debt: balance_sheet.total_debt,
        }
    }
}

/// The fixed set of ratios produced by [`compute_ratios`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatioName {
    GrossMargin,
    OperatingMargin,
    NetProfitMargin,
    Roa,
    Roe,
    AssetTurnover,
    CostToRevenue,
    OperatingCostRatio,
    CurrentRatio,
    CashRatio,
    DebtToEquity,
    DebtRatio,
    EquityRatio,
}

impl RatioName {
    pub const ALL: [RatioName; 13] = [
        RatioName::GrossMargin,
        RatioName::OperatingMargin,
        RatioName::NetProfitMargin,
        RatioName::Roa,
        RatioName::Roe,
        RatioName::AssetTurnover,
        RatioName::CostToRevenue,
        RatioName::OperatingCostRatio,
        RatioName::CurrentRatio,
        RatioName::CashRatio,
        RatioName::DebtToEquity,
        RatioName::DebtRatio,
        RatioName::EquityRatio,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::GrossMargin => "Gross Margin",
            Self::OperatingMargin => "Operating Margin",
            Self::NetProfitMargin => "Net Profit Margin",
            Self::Roa => "ROA",
            Self::Roe => "ROE",
            Self::AssetTurnover => "Asset Turnover",
            Self::CostToRevenue => "Cost-to-Revenue",
            Self::OperatingCostRatio => "Operating Cost Ratio",
            Self::CurrentRatio => "Current Ratio",
            Self::CashRatio => "Cash Ratio",
            Self::DebtToEquity => "Debt-to-Equity",
            Self::DebtRatio => "Debt Ratio",
            Self::EquityRatio => "Equity Ratio",
        }
    }
}

impl fmt::Display for RatioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioSet {
    // Profitability
    pub gross_margin: RatioValue,
    pub operating_margin: RatioValue,
    pub net_profit_margin: RatioValue,
    // Return
    pub roa: RatioValue,
    pub roe: RatioValue,
    // Efficiency
    pub asset_turnover: RatioValue,
    pub cost_to_revenue: RatioValue,
    pub operating_cost_ratio: RatioValue,
    // Liquidity
    pub current_ratio: RatioValue,
    pub cash_ratio: RatioValue,
    // Solvency
    pub debt_to_equity: RatioValue,
    pub debt_ratio: RatioValue,
    pub equity_ratio: RatioValue,
}

impl RatioSet {
    pub fn get(&self, name: RatioName) -> RatioValue {
        match name {
            RatioName::GrossMargin => self.gross_margin,
            RatioName::OperatingMargin => self.operating_margin,
            RatioName::NetProfitMargin => self.net_profit_margin,
            RatioName::Roa => self.roa,
            RatioName::Roe => self.roe,
            RatioName::AssetTurnover => self.asset_turnover,
            RatioName::CostToRevenue => self.cost_to_revenue,
            RatioName::OperatingCostRatio => self.operating_cost_ratio,
            RatioName::CurrentRatio => self.current_ratio,
            RatioName::CashRatio => self.cash_ratio,
            RatioName::DebtToEquity => self.debt_to_equity,
            RatioName::DebtRatio => self.debt_ratio,
            RatioName::EquityRatio => self.equity_ratio,
        }
    }

    /// Ratios in display order, paired with their names.
    pub fn entries(&self) -> impl Iterator<Item = (RatioName, RatioValue)> + '_ {
        RatioName::ALL.iter().map(move |n| (*n, self.get(*n)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialHealthOutput {
    pub ratios: RatioSet,
    pub assessment: HealthAssessment,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the ratio set from statement figures.
///
/// Zero denominators never fail: margins, returns and the asset-based
/// ratios fall back to zero, while coverage-style ratios (current, cash,
/// debt-to-equity) become unbounded.
pub fn compute_ratios(inputs: &FinancialStatementInputs) -> RatioSet {
    let revenue = inputs.revenue;
    let gross_profit = revenue - inputs.cogs;
    let operating_profit = gross_profit - inputs.operating_cost;

    RatioSet {
        gross_margin: RatioValue::or_zero(gross_profit, revenue),
        operating_margin: RatioValue::or_zero(operating_profit, revenue),
        net_profit_margin: RatioValue::or_zero(inputs.net_profit, revenue),
        roa: RatioValue::or_zero(inputs.net_profit, inputs.total_assets),
        roe: RatioValue::or_zero(inputs.net_profit, inputs.equity),
        asset_turnover: RatioValue::or_zero(revenue, inputs.total_assets),
        cost_to_revenue: RatioValue::or_zero(inputs.total_cost, revenue),
        operating_cost_ratio: RatioValue::or_zero(inputs.operating_cost, revenue),
        current_ratio: RatioValue::or_infinite(inputs.current_assets, inputs.current_liabilities),
        cash_ratio: RatioValue::or_infinite(inputs.cash, inputs.current_liabilities),
        debt_to_equity: RatioValue::or_infinite(inputs.total_debt, inputs.equity),
        debt_ratio: RatioValue::or_zero(inputs.total_debt, inputs.total_assets),
        equity_ratio: RatioValue::or_zero(inputs.equity, inputs.total_assets),
    }
}

/// Ratios plus the four-category health assessment, in the standard envelope.
pub fn analyze_financial_health(
    inputs: &FinancialStatementInputs,
) -> PlannerResult<ComputationOutput<FinancialHealthOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(inputs)?;

    if inputs.revenue.is_zero() {
        warnings.push("Revenue is zero; margin and cost ratios reported as 0.".into());
    }

    let ratios = compute_ratios(inputs);
    for (name, value) in ratios.entries() {
        if value.is_infinite() {
            warnings.push(format!("{name} is unbounded (zero denominator)."));
        }
    }

    let assessment = assess_health(&ratios);
    debug!(score = assessment.score, "financial health assessed");

    let output = FinancialHealthOutput { ratios, assessment };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Financial Ratio Analysis & Health Scoring",
        &serde_json::json!({
            "zero_denominator": "0 for margins/returns/asset ratios, Infinity for current, cash and debt-to-equity",
            "points": "Strong=2, Acceptable=1, Weak=0 per category",
            "total_cost_reconciled": false,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(inputs: &FinancialStatementInputs) -> PlannerResult<()> {
    let non_negative = [
        ("revenue", inputs.revenue),
        ("cogs", inputs.cogs),
        ("operating_cost", inputs.operating_cost),
        ("total_cost", inputs.total_cost),
        ("total_assets", inputs.total_assets),
        ("equity", inputs.equity),
        ("current_assets", inputs.current_assets),
        ("current_liabilities", inputs.current_liabilities),
        ("cash", inputs.cash),
        ("total_debt", inputs.total_debt),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(PlannerError::invalid(field, "Must not be negative."));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> FinancialStatementInputs {
        FinancialStatementInputs::from_operations(
            dec!(1_000_000),
            dec!(550_000),
            dec!(250_000),
            BalanceSheet {
                total_assets: dec!(800_000),
                equity: dec!(500_000),
                current_assets: dec!(300_000),
                current_liabilities: dec!(150_000),
                cash: dec!(90_000),
                total_debt: dec!(300_000),
            },
        )
    }

    #[test]
    fn test_from_operations_derives_totals() {
        let input = sample_input();
        assert_eq!(input.total_cost, dec!(800_000));
        assert_eq!(input.net_profit, dec!(200_000));
    }

    #[test]
    fn test_basic_ratios() {
        let r = compute_ratios(&sample_input());

        // (1M - 550k) / 1M
        assert_eq!(r.gross_margin, RatioValue::Finite(dec!(0.45)));
        // (1M - 550k - 250k) / 1M
        assert_eq!(r.operating_margin, RatioValue::Finite(dec!(0.2)));
        assert_eq!(r.net_profit_margin, RatioValue::Finite(dec!(0.2)));
        // 200k / 800k
        assert_eq!(r.roa, RatioValue::Finite(dec!(0.25)));
        // 200k / 500k
        assert_eq!(r.roe, RatioValue::Finite(dec!(0.4)));
        assert_eq!(r.asset_turnover, RatioValue::Finite(dec!(1.25)));
        assert_eq!(r.cost_to_revenue, RatioValue::Finite(dec!(0.8)));
        assert_eq!(r.operating_cost_ratio, RatioValue::Finite(dec!(0.25)));
        assert_eq!(r.current_ratio, RatioValue::Finite(dec!(2)));
        assert_eq!(r.cash_ratio, RatioValue::Finite(dec!(0.6)));
        assert_eq!(r.debt_to_equity, RatioValue::Finite(dec!(0.6)));
        assert_eq!(r.debt_ratio, RatioValue::Finite(dec!(0.375)));
        assert_eq!(r.equity_ratio, RatioValue::Finite(dec!(0.625)));
    }

    #[test]
    fn test_zero_current_liabilities_is_unbounded() {
        let mut input = sample_input();
        input.current_liabilities = Decimal::ZERO;
        let r = compute_ratios(&input);
        assert_eq!(r.current_ratio, RatioValue::Infinite);
        assert_eq!(r.cash_ratio, RatioValue::Infinite);
    }

    #[test]
    fn test_zero_revenue_margins_are_zero() {
        let mut input = sample_input();
        input.revenue = Decimal::ZERO;
        let r = compute_ratios(&input);
        assert_eq!(r.gross_margin, RatioValue::ZERO);
        assert_eq!(r.operating_margin, RatioValue::ZERO);
        assert_eq!(r.net_profit_margin, RatioValue::ZERO);
        assert_eq!(r.cost_to_revenue, RatioValue::ZERO);
    }

    #[test]
    fn test_zero_equity_asymmetry() {
        let mut input = sample_input();
        input.equity = Decimal::ZERO;
        let r = compute_ratios(&input);
        assert_eq!(r.roe, RatioValue::ZERO);
        assert_eq!(r.debt_to_equity, RatioValue::Infinite);
    }

    #[test]
    fn test_compute_ratios_is_pure() {
        let input = sample_input();
        assert_eq!(compute_ratios(&input), compute_ratios(&input));
    }

    #[test]
    fn test_entries_follow_display_order() {
        let r = compute_ratios(&sample_input());
        let names: Vec<&str> = r.entries().map(|(n, _)| n.label()).collect();
        assert_eq!(names.len(), 13);
        assert_eq!(names[0], "Gross Margin");
        assert_eq!(names[12], "Equity Ratio");
    }

    #[test]
    fn test_envelope_warns_on_unbounded() {
        let mut input = sample_input();
        input.current_liabilities = Decimal::ZERO;
        let out = analyze_financial_health(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("Current Ratio")));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_negative_assets_rejected() {
        let mut input = sample_input();
        input.total_assets = dec!(-1);
        match analyze_financial_health(&input) {
            Err(PlannerError::InvalidInput { field, .. }) => assert_eq!(field, "total_assets"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
