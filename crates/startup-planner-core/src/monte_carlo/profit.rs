use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::time::Instant;
use tracing::debug;

use super::stats::{
    build_histogram, mean_and_std, sort_samples, HistogramBin, Percentiles, HISTOGRAM_BINS,
};
use crate::types::*;
use crate::{PlannerError, PlannerResult};

fn default_num_simulations() -> u32 {
    1000
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Distribution parameters for one batch of profit draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitSimulationParams {
    pub price_mean: f64,
    pub price_std: f64,
    pub demand_mean: f64,
    pub demand_std: f64,
    pub fixed_cost: f64,
    /// Variable cost per unit sold
    pub variable_cost: f64,
    pub num_simulations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitSimulationInput {
    pub price_mean: f64,
    pub price_std: f64,
    pub demand_mean: f64,
    pub demand_std: f64,
    pub fixed_cost: f64,
    pub variable_cost: f64,
    #[serde(default = "default_num_simulations")]
    pub num_simulations: u32,
    /// Seed for reproducible runs; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Return the sorted profit sequence alongside the statistics
    #[serde(default)]
    pub include_samples: bool,
}

impl ProfitSimulationInput {
    pub fn params(&self) -> ProfitSimulationParams {
        ProfitSimulationParams {
            price_mean: self.price_mean,
            price_std: self.price_std,
            demand_mean: self.demand_mean,
            demand_std: self.demand_std,
            fixed_cost: self.fixed_cost,
            variable_cost: self.variable_cost,
            num_simulations: self.num_simulations,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitSimulationOutput {
    pub num_simulations: u32,
    pub expected_profit: f64,
    pub std_dev: f64,
    /// Fraction of draws with profit below zero
    pub probability_of_loss: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    pub histogram: Vec<HistogramBin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profits: Option<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// A normal draw, or a point mass when the standard deviation is zero.
enum Draw {
    Point(f64),
    Normal(Normal),
}

impl Draw {
    fn new(field: &str, mean: f64, std_dev: f64) -> PlannerResult<Self> {
        if std_dev == 0.0 {
            return Ok(Draw::Point(mean));
        }
        Normal::new(mean, std_dev)
            .map(Draw::Normal)
            .map_err(|e| PlannerError::invalid(field, format!("Invalid Normal parameters: {e}")))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Draw::Point(v) => *v,
            Draw::Normal(n) => n.sample(rng),
        }
    }
}

/// Draw `num_simulations` independent profits.
///
/// Price and demand are sampled independently from their own normal
/// distributions; `profit = price * demand - (fixed_cost + variable_cost * demand)`.
/// Samples are returned in draw order.
pub fn simulate<R: Rng + ?Sized>(
    rng: &mut R,
    params: &ProfitSimulationParams,
) -> PlannerResult<Vec<f64>> {
    validate_params(params)?;

    let price = Draw::new("price_std", params.price_mean, params.price_std)?;
    let demand = Draw::new("demand_std", params.demand_mean, params.demand_std)?;

    let n = params.num_simulations as usize;
    let mut profits = Vec::with_capacity(n);
    for _ in 0..n {
        let p = price.sample(rng);
        let d = demand.sample(rng);
        profits.push(p * d - (params.fixed_cost + params.variable_cost * d));
    }

    debug!(n, "profit samples drawn");
    Ok(profits)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate profit under uncertain price and demand and summarise the
/// resulting distribution.
pub fn run_profit_simulation(
    input: &ProfitSimulationInput,
) -> PlannerResult<ComputationOutput<ProfitSimulationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = input.params();
    if params.num_simulations < 100 {
        warnings.push(format!(
            "Only {} simulations; statistics will be noisy.",
            params.num_simulations
        ));
    }

    let mut rng = match input.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut profits = simulate(&mut rng, &params)?;
    sort_samples(&mut profits);

    let (expected_profit, std_dev) = mean_and_std(&profits);
    let losses = profits.iter().filter(|p| **p < 0.0).count();
    let probability_of_loss = losses as f64 / profits.len() as f64;

    let output = ProfitSimulationOutput {
        num_simulations: params.num_simulations,
        expected_profit,
        std_dev,
        probability_of_loss,
        min: profits[0],
        max: profits[profits.len() - 1],
        percentiles: Percentiles::from_sorted(&profits),
        histogram: build_histogram(&profits, HISTOGRAM_BINS),
        profits: input.include_samples.then_some(profits),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Monte Carlo Profit Simulation",
        &serde_json::json!({
            "num_simulations": params.num_simulations,
            "seed": input.seed,
            "price": { "mean": params.price_mean, "std": params.price_std },
            "demand": { "mean": params.demand_mean, "std": params.demand_std },
            "sampling": "price and demand drawn independently from normal distributions",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_params(params: &ProfitSimulationParams) -> PlannerResult<()> {
    if params.num_simulations == 0 {
        return Err(PlannerError::invalid(
            "num_simulations",
            "At least one simulation is required.",
        ));
    }
    let fields = [
        ("price_mean", params.price_mean),
        ("price_std", params.price_std),
        ("demand_mean", params.demand_mean),
        ("demand_std", params.demand_std),
        ("fixed_cost", params.fixed_cost),
        ("variable_cost", params.variable_cost),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(PlannerError::invalid(field, "Must be a finite number."));
        }
        if value < 0.0 {
            return Err(PlannerError::invalid(field, "Cannot be negative."));
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

    fn base_input() -> ProfitSimulationInput {
        ProfitSimulationInput {
            price_mean: 50.0,
            price_std: 5.0,
            demand_mean: 100.0,
            demand_std: 20.0,
            fixed_cost: 2000.0,
            variable_cost: 20.0,
            num_simulations: 10_000,
            seed: Some(42),
            include_samples: false,
        }
    }

    #[test]
    fn test_zero_std_is_point_mass() {
        let mut params = base_input().params();
        params.price_std = 0.0;
        params.demand_std = 0.0;
        let mut rng = StdRng::seed_from_u64(1);
        let samples = simulate(&mut rng, &params).unwrap();
        let expected = 50.0 * 100.0 - (2000.0 + 20.0 * 100.0);
        assert_eq!(samples.len(), 10_000);
        assert!(samples.iter().all(|s| *s == expected));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = run_profit_simulation(&base_input()).unwrap();
        let b = run_profit_simulation(&base_input()).unwrap();
        assert_eq!(a.result.expected_profit, b.result.expected_profit);
        assert_eq!(a.result.percentiles, b.result.percentiles);
    }

    #[test]
    fn test_mean_converges_to_analytic_value() {
        // E[profit] = 50 * 100 - 2000 - 20 * 100 = 1000
        let out = run_profit_simulation(&base_input()).unwrap().result;
        assert!((out.expected_profit - 1000.0).abs() < 50.0);
        assert!(out.probability_of_loss > 0.0 && out.probability_of_loss < 0.5);
        assert!(out.min <= out.percentiles.p5);
        assert!(out.percentiles.p5 <= out.percentiles.p50);
        assert!(out.percentiles.p50 <= out.percentiles.p95);
        assert!(out.percentiles.p95 <= out.max);
        assert_eq!(out.histogram.len(), HISTOGRAM_BINS);
        assert!(out.profits.is_none());
    }

    #[test]
    fn test_samples_returned_sorted_on_request() {
        let mut input = base_input();
        input.num_simulations = 500;
        input.include_samples = true;
        let out = run_profit_simulation(&input).unwrap().result;
        let profits = out.profits.unwrap();
        assert_eq!(profits.len(), 500);
        assert!(profits.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_small_run_warns() {
        let mut input = base_input();
        input.num_simulations = 10;
        let out = run_profit_simulation(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.metadata.precision, "ieee754_f64");
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut input = base_input();
        input.price_std = -1.0;
        assert!(run_profit_simulation(&input).is_err());

        let mut input = base_input();
        input.num_simulations = 0;
        assert!(run_profit_simulation(&input).is_err());

        let mut input = base_input();
        input.demand_mean = f64::NAN;
        assert!(run_profit_simulation(&input).is_err());
    }

    #[test]
    fn test_all_losses() {
        let mut input = base_input();
        input.fixed_cost = 1_000_000.0;
        let out = run_profit_simulation(&input).unwrap().result;
        assert_eq!(out.probability_of_loss, 1.0);
    }
}
