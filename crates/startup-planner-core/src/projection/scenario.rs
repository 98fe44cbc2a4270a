use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

use super::cash_flow::{
    average_net_cash_flow, cash_extremes, default_months, project, runway, validate_params,
    ProjectionSeries, ScenarioParams,
};
use crate::types::*;
use crate::{PlannerError, PlannerResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedScenario {
    pub name: String,
    pub params: ScenarioParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub name: String,
    pub rows: ProjectionSeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparisonInput {
    pub initial_cash: Money,
    pub scenarios: Vec<NamedScenario>,
    #[serde(default = "default_months")]
    pub months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub ending_cash: Money,
    pub average_net_cash_flow: Money,
    pub runway_months: RatioValue,
    pub minimum_cash: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub projections: Vec<ScenarioProjection>,
    pub summaries: Vec<ScenarioSummary>,
    /// Scenario with the highest ending cash (first one on ties)
    pub best_scenario: String,
}

/// Best / base / worst presets around a starting revenue and fixed cost.
pub fn preset_scenarios(revenue: Money, fixed_cost: Money) -> Vec<NamedScenario> {
    [
        ("Best", dec!(0.15), dec!(0.25)),
        ("Base", dec!(0.05), dec!(0.30)),
        ("Worst", dec!(-0.10), dec!(0.40)),
    ]
    .into_iter()
    .map(|(name, growth_rate, variable_cost_ratio)| NamedScenario {
        name: name.to_string(),
        params: ScenarioParams {
            revenue,
            growth_rate,
            fixed_cost,
            variable_cost_ratio,
        },
    })
    .collect()
}

/// Project every scenario from the same starting cash, in input order.
pub fn project_many(
    initial_cash: Money,
    scenarios: &[NamedScenario],
    months: u32,
) -> PlannerResult<Vec<ScenarioProjection>> {
    if scenarios.is_empty() {
        return Err(PlannerError::InsufficientData(
            "At least one scenario required".into(),
        ));
    }

    let mut seen = HashSet::new();
    for s in scenarios {
        if !seen.insert(s.name.as_str()) {
            return Err(PlannerError::invalid(
                "scenarios",
                format!("Duplicate scenario name '{}'", s.name),
            ));
        }
    }

    scenarios
        .iter()
        .map(|s| {
            Ok(ScenarioProjection {
                name: s.name.clone(),
                rows: project(initial_cash, &s.params, months)?,
            })
        })
        .collect()
}

pub fn compare_scenarios(
    input: &ScenarioComparisonInput,
) -> PlannerResult<ComputationOutput<ScenarioComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for s in &input.scenarios {
        validate_params(&format!("scenario:{}.", s.name), &s.params)?;
    }

    let projections = project_many(input.initial_cash, &input.scenarios, input.months)?;

    let summaries: Vec<ScenarioSummary> = projections
        .iter()
        .map(|p| -> PlannerResult<ScenarioSummary> {
            let average = average_net_cash_flow(&p.rows)?;
            let (minimum_cash, first_negative) = cash_extremes(&p.rows);
            if let Some(month) = first_negative {
                warnings.push(format!(
                    "Scenario '{}': cash balance turns negative in month {month}.",
                    p.name
                ));
            }
            Ok(ScenarioSummary {
                name: p.name.clone(),
                ending_cash: p
                    .rows
                    .last()
                    .map(|r| r.cash_balance)
                    .unwrap_or(input.initial_cash),
                average_net_cash_flow: average,
                runway_months: runway(input.initial_cash, average),
                minimum_cash,
            })
        })
        .collect::<PlannerResult<_>>()?;

    let mut best = &summaries[0];
    for s in &summaries[1..] {
        if s.ending_cash > best.ending_cash {
            best = s;
        }
    }
    let best_scenario = best.name.clone();
    debug!(
        scenarios = summaries.len(),
        best = %best_scenario,
        "scenarios compared"
    );

    let output = ScenarioComparison {
        projections,
        summaries,
        best_scenario,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multi-Scenario Cash Flow Comparison",
        &serde_json::json!({
            "initial_cash": input.initial_cash.to_string(),
            "months": input.months,
            "num_scenarios": input.scenarios.len(),
            "shared": "initial cash only; scenarios are independent",
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

    #[test]
    fn test_presets_in_order() {
        let presets = preset_scenarios(dec!(10000), dec!(4000));
        let names: Vec<&str> = presets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Best", "Base", "Worst"]);
        assert_eq!(presets[2].params.growth_rate, dec!(-0.10));
        assert_eq!(presets[0].params.variable_cost_ratio, dec!(0.25));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut scenarios = preset_scenarios(dec!(10000), dec!(4000));
        scenarios[1].name = "Best".into();
        assert!(project_many(dec!(0), &scenarios, 12).is_err());
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            project_many(dec!(0), &[], 12),
            Err(PlannerError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_compare_picks_best_ending_cash() {
        let input = ScenarioComparisonInput {
            initial_cash: dec!(50000),
            scenarios: preset_scenarios(dec!(10000), dec!(4000)),
            months: 24,
        };
        let out = compare_scenarios(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.projections.len(), 3);
        assert_eq!(r.summaries.len(), 3);
        assert_eq!(r.best_scenario, "Best");
        assert!(r.summaries[0].ending_cash > r.summaries[1].ending_cash);
        assert!(r.summaries[1].ending_cash > r.summaries[2].ending_cash);
        assert!(r.projections.iter().all(|p| p.rows.len() == 24));
    }

    #[test]
    fn test_scenarios_share_only_initial_cash() {
        let scenarios = preset_scenarios(dec!(10000), dec!(4000));
        let many = project_many(dec!(50000), &scenarios, 6).unwrap();
        let single = project(dec!(50000), &scenarios[2].params, 6).unwrap();
        assert_eq!(many[2].rows, single);
    }
}
