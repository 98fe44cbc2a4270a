use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::viability::{classify_viability, recommendations, Advice, Severity, Verdict};
use crate::types::*;
use crate::{PlannerError, PlannerResult};

/// Decimal places used for monetary values and multiples on display.
const MONEY_DP: u32 = 2;
/// Decimal places used for the payback period on display.
const PAYBACK_DP: u32 = 1;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitEconomicsInput {
    /// Average revenue per user per period
    pub arpu: Money,
    /// Customer acquisition cost
    pub cac: Money,
    /// Churn per period, as a fraction (0.05 = 5%)
    pub churn: Rate,
    /// Gross margin as a fraction
    pub gross_margin: Rate,
}

/// Unrounded metrics, for anything computed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreciseUnitMetrics {
    pub ltv: Money,
    pub ltv_to_cac: RatioValue,
    pub payback_months: RatioValue,
    pub net_unit_profit: Money,
}

/// Unit economics as presented to the operator: money and multiples at
/// two decimals, payback at one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEconomicsResult {
    pub arpu: Money,
    pub cac: Money,
    pub ltv: Money,
    pub ltv_to_cac: RatioValue,
    pub payback_months: RatioValue,
    pub net_unit_profit: Money,
    pub churn: Rate,
    pub gross_margin: Rate,
    pub precise: PreciseUnitMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitEconomicsOutput {
    pub metrics: UnitEconomicsResult,
    pub verdict: Verdict,
    pub severity: Severity,
    pub recommendations: Vec<Advice>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute LTV, LTV/CAC, CAC payback and net unit profit.
///
/// Zero churn reports LTV as zero rather than unbounded; zero CAC makes
/// LTV/CAC unbounded, and zero contribution per user (ARPU x margin) makes
/// payback unbounded.
pub fn compute(arpu: Money, cac: Money, churn: Rate, gross_margin: Rate) -> UnitEconomicsResult {
    let contribution = arpu * gross_margin;

    let ltv = if churn.is_zero() {
        Decimal::ZERO
    } else {
        contribution / churn
    };
    let ltv_to_cac = RatioValue::or_infinite(ltv, cac);
    let payback_months = RatioValue::or_infinite(cac, contribution);
    let net_unit_profit = ltv - cac;

    UnitEconomicsResult {
        arpu: arpu.round_dp(MONEY_DP),
        cac: cac.round_dp(MONEY_DP),
        ltv: ltv.round_dp(MONEY_DP),
        ltv_to_cac: ltv_to_cac.round_dp(MONEY_DP),
        payback_months: payback_months.round_dp(PAYBACK_DP),
        net_unit_profit: net_unit_profit.round_dp(MONEY_DP),
        churn,
        gross_margin,
        precise: PreciseUnitMetrics {
            ltv,
            ltv_to_cac,
            payback_months,
            net_unit_profit,
        },
    }
}

/// Metrics, viability verdict and recommendations in the standard envelope.
pub fn analyze_unit_economics(
    input: &UnitEconomicsInput,
) -> PlannerResult<ComputationOutput<UnitEconomicsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    if input.churn.is_zero() {
        warnings.push("Churn is zero; LTV is undefined and reported as 0.".into());
    }
    if input.cac.is_zero() {
        warnings.push("CAC is zero; LTV/CAC is unbounded.".into());
    }

    let metrics = compute(input.arpu, input.cac, input.churn, input.gross_margin);
    let (verdict, severity) = classify_viability(&metrics);
    let recommendations = recommendations(&metrics);
    debug!(?verdict, ltv = %metrics.ltv, "unit economics classified");

    let output = UnitEconomicsOutput {
        metrics,
        verdict,
        severity,
        recommendations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Unit Economics (LTV / CAC / Payback)",
        &serde_json::json!({
            "ltv": "arpu * gross_margin / churn",
            "payback": "cac / (arpu * gross_margin)",
            "rounding": "2dp money and multiples, 1dp payback; verdict uses rounded values",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &UnitEconomicsInput) -> PlannerResult<()> {
    if input.arpu < Decimal::ZERO {
        return Err(PlannerError::invalid("arpu", "ARPU cannot be negative."));
    }
    if input.cac < Decimal::ZERO {
        return Err(PlannerError::invalid("cac", "CAC cannot be negative."));
    }
    if input.churn < Decimal::ZERO || input.churn > Decimal::ONE {
        return Err(PlannerError::invalid("churn", "Churn must be between 0 and 1."));
    }
    if input.gross_margin < Decimal::ZERO || input.gross_margin > Decimal::ONE {
        return Err(PlannerError::invalid(
            "gross_margin",
            "Gross margin must be between 0 and 1.",
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
    use rust_decimal_macros::dec;

    #[test]
    fn test_basic_unit_economics() {
        // contribution = 50 * 0.8 = 40; LTV = 40 / 0.05 = 800
        let r = compute(dec!(50), dec!(200), dec!(0.05), dec!(0.8));
        assert_eq!(r.ltv, dec!(800));
        assert_eq!(r.ltv_to_cac, RatioValue::Finite(dec!(4)));
        assert_eq!(r.payback_months, RatioValue::Finite(dec!(5)));
        assert_eq!(r.net_unit_profit, dec!(600));
    }

    #[test]
    fn test_zero_churn_reports_zero_ltv() {
        let r = compute(dec!(50), dec!(200), Decimal::ZERO, dec!(0.8));
        assert_eq!(r.ltv, Decimal::ZERO);
        assert_eq!(r.ltv_to_cac, RatioValue::ZERO);
        assert_eq!(r.net_unit_profit, dec!(-200));
    }

    #[test]
    fn test_zero_cac_is_unbounded() {
        let r = compute(dec!(50), Decimal::ZERO, dec!(0.05), dec!(0.8));
        assert_eq!(r.ltv_to_cac, RatioValue::Infinite);
        assert_eq!(r.payback_months, RatioValue::ZERO);
    }

    #[test]
    fn test_zero_contribution_payback_unbounded() {
        let r = compute(Decimal::ZERO, dec!(100), dec!(0.05), dec!(0.8));
        assert_eq!(r.payback_months, RatioValue::Infinite);
    }

    #[test]
    fn test_rounding_keeps_precise_values() {
        // contribution = 30 * 0.6 = 18; LTV = 18 / 0.07 = 257.142857...
        let r = compute(dec!(30), dec!(100), dec!(0.07), dec!(0.6));
        assert_eq!(r.ltv, dec!(257.14));
        assert!(r.precise.ltv > dec!(257.1428));
        assert!(r.precise.ltv < dec!(257.1429));
        // payback = 100 / 18 = 5.555... -> 5.6
        assert_eq!(r.payback_months, RatioValue::Finite(dec!(5.6)));
    }

    #[test]
    fn test_churn_out_of_range_rejected() {
        let input = UnitEconomicsInput {
            arpu: dec!(50),
            cac: dec!(200),
            churn: dec!(1.5),
            gross_margin: dec!(0.8),
        };
        assert!(analyze_unit_economics(&input).is_err());
    }

    #[test]
    fn test_envelope_contains_verdict_and_five_recommendations() {
        let input = UnitEconomicsInput {
            arpu: dec!(50),
            cac: dec!(200),
            churn: dec!(0.05),
            gross_margin: dec!(0.8),
        };
        let out = analyze_unit_economics(&input).unwrap();
        assert_eq!(out.result.verdict, Verdict::HighlyViable);
        assert_eq!(out.result.recommendations.len(), 5);
    }
}
