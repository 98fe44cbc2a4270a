use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::check_fraction;
use crate::types::*;
use crate::{PlannerError, PlannerResult};

fn default_sam_ratio() -> Rate {
    dec!(0.3)
}

fn default_som_ratio() -> Rate {
    dec!(0.1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSizeInput {
    /// Potential customers in the total market
    pub total_customers: Decimal,
    /// Annual revenue per customer
    pub arpu: Money,
    /// Share of the total market the product targets
    #[serde(default = "default_sam_ratio")]
    pub sam_ratio: Rate,
    /// Share of the target market realistically obtainable
    #[serde(default = "default_som_ratio")]
    pub som_ratio: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSize {
    pub tam: Money,
    pub sam: Money,
    pub som: Money,
}

pub fn market_size(
    total_customers: Decimal,
    arpu: Money,
    sam_ratio: Rate,
    som_ratio: Rate,
) -> MarketSize {
    let tam = total_customers * arpu;
    let sam = tam * sam_ratio;
    MarketSize {
        tam,
        sam,
        som: sam * som_ratio,
    }
}

/// Top-down TAM / SAM / SOM estimate.
pub fn estimate_market_size(input: &MarketSizeInput) -> PlannerResult<ComputationOutput<MarketSize>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.total_customers < Decimal::ZERO {
        return Err(PlannerError::invalid(
            "total_customers",
            "Customer count cannot be negative.",
        ));
    }
    if input.arpu < Decimal::ZERO {
        return Err(PlannerError::invalid("arpu", "ARPU cannot be negative."));
    }
    check_fraction("sam_ratio", input.sam_ratio)?;
    check_fraction("som_ratio", input.som_ratio)?;

    let result = market_size(input.total_customers, input.arpu, input.sam_ratio, input.som_ratio);
    if result.tam.is_zero() {
        warnings.push("Total addressable market is zero.".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Market Sizing (TAM / SAM / SOM)",
        &serde_json::json!({
            "tam": "total_customers * arpu",
            "sam": "tam * sam_ratio",
            "som": "sam * som_ratio",
        }),
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_funnel() {
        let m = market_size(dec!(100000), dec!(120), dec!(0.3), dec!(0.1));
        assert_eq!(m.tam, dec!(12000000));
        assert_eq!(m.sam, dec!(3600000));
        assert_eq!(m.som, dec!(360000));
    }

    #[test]
    fn test_default_ratios() {
        let input: MarketSizeInput =
            serde_json::from_str(r#"{"total_customers": 1000, "arpu": "50"}"#).unwrap();
        let out = estimate_market_size(&input).unwrap();
        assert_eq!(out.result.sam, dec!(15000));
        assert_eq!(out.result.som, dec!(1500));
    }

    #[test]
    fn test_zero_market_warns() {
        let input = MarketSizeInput {
            total_customers: Decimal::ZERO,
            arpu: dec!(50),
            sam_ratio: dec!(0.3),
            som_ratio: dec!(0.1),
        };
        assert_eq!(estimate_market_size(&input).unwrap().warnings.len(), 1);
    }
}
