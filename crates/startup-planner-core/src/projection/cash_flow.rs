use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::types::*;
use crate::{PlannerError, PlannerResult};

pub(crate) fn default_months() -> u32 {
    24
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Operating assumptions for a single cash-flow path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Revenue in the first projected month
    pub revenue: Money,
    /// Month-over-month revenue growth (0.05 = 5%)
    pub growth_rate: Rate,
    /// Fixed cost per month
    pub fixed_cost: Money,
    /// Variable cost as a fraction of revenue
    pub variable_cost_ratio: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRow {
    /// 1-based month index
    pub month: u32,
    pub revenue: Money,
    pub total_cost: Money,
    pub net_cash_flow: Money,
    pub cash_balance: Money,
}

pub type ProjectionSeries = Vec<ProjectionRow>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowInput {
    pub initial_cash: Money,
    pub revenue: Money,
    pub growth_rate: Rate,
    pub fixed_cost: Money,
    pub variable_cost_ratio: Rate,
    #[serde(default = "default_months")]
    pub months: u32,
}

impl CashFlowInput {
    pub fn params(&self) -> ScenarioParams {
        ScenarioParams {
            revenue: self.revenue,
            growth_rate: self.growth_rate,
            fixed_cost: self.fixed_cost,
            variable_cost_ratio: self.variable_cost_ratio,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowForecast {
    pub rows: ProjectionSeries,
    /// Mean monthly net cash flow; negative values are the average burn
    pub average_net_cash_flow: Money,
    /// Months of cash left at the average burn, unbounded when not burning
    pub runway_months: RatioValue,
    pub ending_cash: Money,
    pub minimum_cash: Money,
    pub first_negative_month: Option<u32>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rows reserved up front; longer horizons grow the vector as they go.
const PREALLOCATED_MONTHS: usize = 120;

/// Project monthly cash flow.
///
/// Each month's revenue is used for that month's row before growth is
/// applied, so month 1 always carries the starting revenue. Fails instead of
/// panicking when compounding leaves the decimal range.
pub fn project(
    initial_cash: Money,
    params: &ScenarioParams,
    months: u32,
) -> PlannerResult<ProjectionSeries> {
    if months == 0 {
        return Err(PlannerError::invalid(
            "months",
            "Projection horizon must be at least one month.",
        ));
    }

    let mut rows = Vec::with_capacity((months as usize).min(PREALLOCATED_MONTHS));
    let mut revenue = params.revenue;
    let mut cash = initial_cash;
    let growth_factor = Decimal::ONE
        .checked_add(params.growth_rate)
        .ok_or_else(|| PlannerError::invalid("growth_rate", "Growth rate is out of range."))?;

    for month in 1..=months {
        let (total_cost, net_cash_flow) =
            month_flows(revenue, params).ok_or_else(|| overflow(month))?;
        cash = cash
            .checked_add(net_cash_flow)
            .ok_or_else(|| overflow(month))?;

        rows.push(ProjectionRow {
            month,
            revenue,
            total_cost,
            net_cash_flow,
            cash_balance: cash,
        });

        if month < months {
            revenue = revenue
                .checked_mul(growth_factor)
                .ok_or_else(|| overflow(month + 1))?;
        }
    }

    Ok(rows)
}

/// Months until cash runs out at a constant burn.
///
/// A non-negative average net cash flow means the business is not burning
/// cash, so runway is unbounded. So is a burn too small to divide by.
pub fn runway(initial_cash: Money, average_burn_rate: Money) -> RatioValue {
    if average_burn_rate >= Decimal::ZERO {
        return RatioValue::Infinite;
    }
    initial_cash
        .checked_div(average_burn_rate.abs())
        .map_or(RatioValue::Infinite, RatioValue::Finite)
}

pub fn average_net_cash_flow(rows: &[ProjectionRow]) -> PlannerResult<Money> {
    if rows.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let total = rows
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.net_cash_flow))
        .ok_or_else(|| {
            PlannerError::invalid(
                "months",
                "Total net cash flow exceeds the decimal range.",
            )
        })?;
    Ok(total / Decimal::from(rows.len()))
}

/// Lowest balance reached and the first month it dips below zero.
pub(crate) fn cash_extremes(rows: &[ProjectionRow]) -> (Money, Option<u32>) {
    let minimum = rows
        .iter()
        .map(|r| r.cash_balance)
        .min()
        .unwrap_or(Decimal::ZERO);
    let first_negative = rows
        .iter()
        .find(|r| r.cash_balance < Decimal::ZERO)
        .map(|r| r.month);
    (minimum, first_negative)
}

/// Project a single path and report runway, ending and minimum cash.
pub fn forecast_cash_flow(
    input: &CashFlowInput,
) -> PlannerResult<ComputationOutput<CashFlowForecast>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = input.params();
    validate_params("", &params)?;

    let rows = project(input.initial_cash, &params, input.months)?;
    let average = average_net_cash_flow(&rows)?;
    let runway_months = runway(input.initial_cash, average);
    let (minimum_cash, first_negative_month) = cash_extremes(&rows);
    let ending_cash = rows.last().map(|r| r.cash_balance).unwrap_or(input.initial_cash);

    if let Some(month) = first_negative_month {
        warnings.push(format!("Cash balance turns negative in month {month}."));
    }
    if input.initial_cash <= Decimal::ZERO && average < Decimal::ZERO {
        warnings.push("No starting cash while burning; runway is zero or negative.".into());
    }
    debug!(months = input.months, %average, %runway_months, "cash flow projected");

    let output = CashFlowForecast {
        rows,
        average_net_cash_flow: average,
        runway_months,
        ending_cash,
        minimum_cash,
        first_negative_month,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly Cash Flow Projection",
        &serde_json::json!({
            "initial_cash": input.initial_cash.to_string(),
            "months": input.months,
            "growth": "applied after each month's row",
            "runway": "initial_cash / |average net cash flow| when negative",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Total cost and net cash flow for one month's revenue.
fn month_flows(revenue: Money, params: &ScenarioParams) -> Option<(Money, Money)> {
    let variable_cost = revenue.checked_mul(params.variable_cost_ratio)?;
    let total_cost = params.fixed_cost.checked_add(variable_cost)?;
    Some((total_cost, revenue.checked_sub(total_cost)?))
}

fn overflow(month: u32) -> PlannerError {
    PlannerError::invalid(
        "months",
        format!(
            "Projection exceeds the decimal range in month {month}; \
             shorten the horizon or lower growth."
        ),
    )
}

/// `prefix` qualifies field names, e.g. "scenario:Base." for one entry of a
/// scenario list.
pub(crate) fn validate_params(prefix: &str, params: &ScenarioParams) -> PlannerResult<()> {
    if params.revenue < Decimal::ZERO {
        return Err(PlannerError::invalid(
            format!("{prefix}revenue"),
            "Revenue cannot be negative.",
        ));
    }
    if params.fixed_cost < Decimal::ZERO {
        return Err(PlannerError::invalid(
            format!("{prefix}fixed_cost"),
            "Fixed cost cannot be negative.",
        ));
    }
    if params.variable_cost_ratio < Decimal::ZERO || params.variable_cost_ratio > Decimal::ONE {
        return Err(PlannerError::invalid(
            format!("{prefix}variable_cost_ratio"),
            "Variable cost ratio must be between 0 and 1.",
        ));
    }
    if params.growth_rate <= -Decimal::ONE {
        return Err(PlannerError::invalid(
            format!("{prefix}growth_rate"),
            "Growth rate must be greater than -100%.",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sample_params() -> ScenarioParams {
        ScenarioParams {
            revenue: dec!(5000),
            growth_rate: dec!(0.05),
            fixed_cost: dec!(2000),
            variable_cost_ratio: dec!(0.3),
        }
    }

    #[test]
    fn test_three_month_projection() {
        let rows = project(dec!(10000), &sample_params(), 3).unwrap();
        let summary: Vec<(Decimal, Decimal, Decimal, Decimal)> = rows
            .iter()
            .map(|r| (r.revenue, r.total_cost, r.net_cash_flow, r.cash_balance))
            .collect();
        assert_eq!(
            summary,
            vec![
                (dec!(5000), dec!(3500), dec!(1500), dec!(11500)),
                (dec!(5250), dec!(3575), dec!(1675), dec!(13175)),
                (dec!(5512.5), dec!(3653.75), dec!(1858.75), dec!(15033.75)),
            ]
        );
        assert_eq!(rows[0].month, 1);
        assert_eq!(rows[2].month, 3);
    }

    #[test]
    fn test_zero_months_rejected() {
        assert!(project(dec!(10000), &sample_params(), 0).is_err());
    }

    #[test]
    fn test_runway() {
        assert_eq!(runway(dec!(12000), dec!(-2000)), RatioValue::Finite(dec!(6)));
        assert_eq!(runway(dec!(12000), dec!(500)), RatioValue::Infinite);
        assert_eq!(runway(dec!(12000), Decimal::ZERO), RatioValue::Infinite);
    }

    #[test]
    fn test_forecast_burning_business() {
        let input = CashFlowInput {
            initial_cash: dec!(3000),
            revenue: dec!(1000),
            growth_rate: Decimal::ZERO,
            fixed_cost: dec!(2000),
            variable_cost_ratio: Decimal::ZERO,
            months: 6,
        };
        let out = forecast_cash_flow(&input).unwrap();
        let f = &out.result;
        assert_eq!(f.rows.len(), 6);
        assert_eq!(f.average_net_cash_flow, dec!(-1000));
        assert_eq!(f.runway_months, RatioValue::Finite(dec!(3)));
        assert_eq!(f.ending_cash, dec!(-3000));
        assert_eq!(f.minimum_cash, dec!(-3000));
        assert_eq!(f.first_negative_month, Some(4));
        assert!(out.warnings.iter().any(|w| w.contains("month 4")));
    }

    #[test]
    fn test_forecast_defaults_to_24_months() {
        let json = r#"{
            "initial_cash": "10000",
            "revenue": "5000",
            "growth_rate": "0.05",
            "fixed_cost": "2000",
            "variable_cost_ratio": "0.3"
        }"#;
        let input: CashFlowInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.months, 24);
        let out = forecast_cash_flow(&input).unwrap();
        assert_eq!(out.result.rows.len(), 24);
        assert_eq!(out.result.runway_months, RatioValue::Infinite);
        assert_eq!(out.result.first_negative_month, None);
    }

    #[test]
    fn test_compounding_past_decimal_range_is_an_error() {
        let params = ScenarioParams {
            growth_rate: dec!(0.5),
            ..sample_params()
        };
        let err = project(dec!(10000), &params, 240).unwrap_err();
        assert!(
            matches!(err, PlannerError::InvalidInput { ref field, ref reason }
                if field == "months" && reason.contains("month"))
        );
        // The same growth is fine over a short horizon.
        assert_eq!(project(dec!(10000), &params, 24).unwrap().len(), 24);
    }

    #[test]
    fn test_runway_with_negligible_burn_is_unbounded() {
        assert_eq!(
            runway(Decimal::MAX, dec!(-0.0000000000000000000000000001)),
            RatioValue::Infinite
        );
    }

    #[test]
    fn test_variable_ratio_out_of_range() {
        let input = CashFlowInput {
            initial_cash: dec!(1000),
            revenue: dec!(1000),
            growth_rate: Decimal::ZERO,
            fixed_cost: dec!(100),
            variable_cost_ratio: dec!(1.2),
            months: 12,
        };
        assert!(forecast_cash_flow(&input).is_err());
    }
}
