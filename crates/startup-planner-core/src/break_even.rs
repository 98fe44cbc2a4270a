#[cfg(feature = "monte_carlo")]
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::types::*;
use crate::{PlannerError, PlannerResult};

/// Demand assumed by the default simulation when there is no break-even point.
#[cfg(feature = "monte_carlo")]
const FALLBACK_DEMAND_MEAN: f64 = 100.0;
#[cfg(feature = "monte_carlo")]
const DEFAULT_DEMAND_STD: f64 = 20.0;
/// Price volatility assumed by the default simulation, as a share of price.
#[cfg(feature = "monte_carlo")]
const DEFAULT_PRICE_VOLATILITY: f64 = 0.1;

fn default_curve_points() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenInput {
    pub fixed_cost: Money,
    /// Selling price per unit
    pub price: Money,
    /// Variable cost per unit
    pub variable_cost: Money,
    /// Number of evenly spaced points on the cost/revenue curve
    #[serde(default = "default_curve_points")]
    pub curve_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub quantity: Decimal,
    pub revenue: Money,
    pub total_cost: Money,
    pub fixed_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenOutput {
    pub break_even_units: Option<Decimal>,
    pub break_even_revenue: Option<Money>,
    /// Price minus variable cost per unit
    pub contribution_margin: Money,
    pub contribution_margin_ratio: Rate,
    /// Quantities from 0 to 1.5x the break-even point; empty without one
    pub curve: Vec<CurvePoint>,
}

/// Units to sell before revenue covers fixed and variable cost.
///
/// `None` when each unit sells for no more than it costs to make.
pub fn break_even_point(fixed_cost: Money, price: Money, variable_cost: Money) -> Option<Decimal> {
    let contribution_margin = price - variable_cost;
    if contribution_margin <= Decimal::ZERO {
        return None;
    }
    Some(fixed_cost / contribution_margin)
}

pub fn analyze_break_even(
    input: &BreakEvenInput,
) -> PlannerResult<ComputationOutput<BreakEvenOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let contribution_margin = input.price - input.variable_cost;
    let contribution_margin_ratio = if input.price.is_zero() {
        Decimal::ZERO
    } else {
        contribution_margin / input.price
    };

    let units = break_even_point(input.fixed_cost, input.price, input.variable_cost);
    if units.is_none() {
        warnings.push(
            "Price must exceed variable cost per unit to reach a break-even point.".into(),
        );
    }

    let curve = match units {
        Some(bep) if bep > Decimal::ZERO => cost_curve(input, bep * dec!(1.5)),
        _ => Vec::new(),
    };
    debug!(?units, points = curve.len(), "break-even computed");

    let output = BreakEvenOutput {
        break_even_units: units,
        break_even_revenue: units.map(|u| u * input.price),
        contribution_margin,
        contribution_margin_ratio,
        curve,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Break-Even Analysis",
        &serde_json::json!({
            "formula": "fixed_cost / (price - variable_cost)",
            "curve_range": "0 to 1.5x break-even units",
            "curve_points": input.curve_points,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Monte-Carlo parameters seeded from a break-even setup: price varies by
/// 10% around the selling price and demand centres on the break-even volume.
#[cfg(feature = "monte_carlo")]
pub fn default_profit_simulation(
    input: &BreakEvenInput,
    num_simulations: u32,
    seed: Option<u64>,
) -> crate::monte_carlo::ProfitSimulationInput {
    let price = input.price.to_f64().unwrap_or(0.0);
    let demand_mean = break_even_point(input.fixed_cost, input.price, input.variable_cost)
        .filter(|u| *u > Decimal::ZERO)
        .and_then(|u| u.to_f64())
        .unwrap_or(FALLBACK_DEMAND_MEAN);

    crate::monte_carlo::ProfitSimulationInput {
        price_mean: price,
        price_std: price * DEFAULT_PRICE_VOLATILITY,
        demand_mean,
        demand_std: DEFAULT_DEMAND_STD,
        fixed_cost: input.fixed_cost.to_f64().unwrap_or(0.0),
        variable_cost: input.variable_cost.to_f64().unwrap_or(0.0),
        num_simulations,
        seed,
        include_samples: false,
    }
}

fn cost_curve(input: &BreakEvenInput, max_quantity: Decimal) -> Vec<CurvePoint> {
    let steps = Decimal::from(input.curve_points - 1);
    (0..input.curve_points)
        .map(|i| {
            let quantity = max_quantity * Decimal::from(i) / steps;
            CurvePoint {
                quantity,
                revenue: input.price * quantity,
                total_cost: input.fixed_cost + input.variable_cost * quantity,
                fixed_cost: input.fixed_cost,
            }
        })
        .collect()
}

fn validate_input(input: &BreakEvenInput) -> PlannerResult<()> {
    for (field, value) in [
        ("fixed_cost", input.fixed_cost),
        ("price", input.price),
        ("variable_cost", input.variable_cost),
    ] {
        if value < Decimal::ZERO {
            return Err(PlannerError::invalid(field, "Cannot be negative."));
        }
    }
    if input.curve_points < 2 {
        return Err(PlannerError::invalid(
            "curve_points",
            "At least two curve points are required.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(fixed_cost: Decimal, price: Decimal, variable_cost: Decimal) -> BreakEvenInput {
        BreakEvenInput {
            fixed_cost,
            price,
            variable_cost,
            curve_points: 100,
        }
    }

    #[test]
    fn test_break_even_point() {
        assert_eq!(break_even_point(dec!(5000), dec!(50), dec!(30)), Some(dec!(250)));
        assert_eq!(break_even_point(dec!(5000), dec!(30), dec!(30)), None);
        assert_eq!(break_even_point(dec!(5000), dec!(20), dec!(30)), None);
    }

    #[test]
    fn test_curve_spans_one_and_a_half_times_break_even() {
        let out = analyze_break_even(&input(dec!(5000), dec!(50), dec!(30))).unwrap();
        let r = &out.result;
        assert_eq!(r.break_even_revenue, Some(dec!(12500)));
        assert_eq!(r.contribution_margin, dec!(20));
        assert_eq!(r.contribution_margin_ratio, dec!(0.4));
        assert_eq!(r.curve.len(), 100);
        assert_eq!(r.curve[0].quantity, Decimal::ZERO);
        assert_eq!(r.curve[99].quantity, dec!(375));
        assert_eq!(r.curve[99].total_cost, dec!(16250));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_no_margin_is_warning_not_error() {
        let out = analyze_break_even(&input(dec!(5000), dec!(20), dec!(30))).unwrap();
        assert_eq!(out.result.break_even_units, None);
        assert!(out.result.curve.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_negative_input_rejected() {
        assert!(analyze_break_even(&input(dec!(-1), dec!(50), dec!(30))).is_err());
    }

    #[cfg(feature = "monte_carlo")]
    #[test]
    fn test_default_simulation_parameters() {
        let sim = default_profit_simulation(&input(dec!(5000), dec!(50), dec!(30)), 1000, Some(7));
        assert_eq!(sim.price_mean, 50.0);
        assert!((sim.price_std - 5.0).abs() < 1e-9);
        assert_eq!(sim.demand_mean, 250.0);
        assert_eq!(sim.demand_std, 20.0);

        let sim = default_profit_simulation(&input(dec!(5000), dec!(20), dec!(30)), 1000, None);
        assert_eq!(sim.demand_mean, 100.0);
    }
}
