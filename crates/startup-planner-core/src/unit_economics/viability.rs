use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::UnitEconomicsResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    HighlyViable,
    AcceptableEarlyStage,
    HighRisk,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::HighlyViable => "Highly viable",
            Self::AcceptableEarlyStage => "Acceptable (early-stage)",
            Self::HighRisk => "High risk",
        };
        f.write_str(s)
    }
}

/// How a verdict should be surfaced (success / warning / error banner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceLevel {
    Critical,
    Warning,
    Positive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMetric {
    LtvToCac,
    Payback,
    Churn,
    GrossMargin,
    NetUnitProfit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub metric: UnitMetric,
    pub level: AdviceLevel,
    pub message: String,
}

impl Advice {
    fn new(metric: UnitMetric, level: AdviceLevel, message: &str) -> Self {
        Self {
            metric,
            level,
            message: message.to_string(),
        }
    }
}

/// Classify business viability from display-rounded unit economics.
///
/// Tiers are checked top-down and the first match wins.
pub fn classify_viability(ue: &UnitEconomicsResult) -> (Verdict, Severity) {
    if ue.ltv_to_cac.at_least(dec!(3))
        && ue.payback_months.at_most(dec!(12))
        && ue.gross_margin >= dec!(0.5)
        && ue.churn <= dec!(0.08)
    {
        (Verdict::HighlyViable, Severity::Success)
    } else if ue.ltv_to_cac.at_least(dec!(2))
        && ue.payback_months.at_most(dec!(18))
        && ue.gross_margin >= dec!(0.3)
        && ue.churn <= dec!(0.15)
    {
        (Verdict::AcceptableEarlyStage, Severity::Warning)
    } else {
        (Verdict::HighRisk, Severity::Error)
    }
}

/// One piece of advice per metric, always in the order LTV/CAC, payback,
/// churn, gross margin, net unit profit.
pub fn recommendations(ue: &UnitEconomicsResult) -> Vec<Advice> {
    use AdviceLevel::*;
    use UnitMetric::*;

    let mut advice = Vec::with_capacity(5);

    advice.push(if !ue.ltv_to_cac.at_least(dec!(1)) {
        Advice::new(
            LtvToCac,
            Critical,
            "Each customer costs more than it returns (LTV < CAC). Stop scaling and restructure the model now.",
        )
    } else if !ue.ltv_to_cac.at_least(dec!(3)) {
        Advice::new(
            LtvToCac,
            Warning,
            "LTV/CAC is low. Reduce CAC (acquisition channels, funnel optimisation) before scaling.",
        )
    } else {
        Advice::new(
            LtvToCac,
            Positive,
            "LTV/CAC is healthy. Consider increasing marketing budget to scale.",
        )
    });

    advice.push(if !ue.payback_months.at_most(dec!(12)) {
        Advice::new(
            Payback,
            Critical,
            "CAC payback is long (>12 months). Cash-flow risk is high; improve retention or pricing.",
        )
    } else if !ue.payback_months.at_most(dec!(6)) {
        Advice::new(
            Payback,
            Warning,
            "Payback is moderate. Monitor cash flow closely while expanding.",
        )
    } else {
        Advice::new(
            Payback,
            Positive,
            "CAC is recovered quickly, which supports fast growth.",
        )
    });

    advice.push(if ue.churn > dec!(0.1) {
        Advice::new(
            Churn,
            Critical,
            "Churn is high. Focus on product-market fit, onboarding and customer success.",
        )
    } else if ue.churn > dec!(0.05) {
        Advice::new(
            Churn,
            Warning,
            "Churn is moderate. Loyalty programmes, subscriptions or upsell can reduce it.",
        )
    } else {
        Advice::new(
            Churn,
            Positive,
            "Churn is low, a strong base for growing LTV over time.",
        )
    });

    advice.push(if ue.gross_margin < dec!(0.4) {
        Advice::new(
            GrossMargin,
            Critical,
            "Gross margin is low. Cut variable costs or raise the value of the product.",
        )
    } else if ue.gross_margin < dec!(0.6) {
        Advice::new(
            GrossMargin,
            Warning,
            "Gross margin is fair but not strong. Improve operating efficiency and automation.",
        )
    } else {
        Advice::new(
            GrossMargin,
            Positive,
            "Gross margin is high, suited to capital-funded scaling.",
        )
    });

    advice.push(if ue.net_unit_profit < Decimal::ZERO {
        Advice::new(
            NetUnitProfit,
            Critical,
            "Unit profit is negative. Do not scale until the economics are fixed.",
        )
    } else {
        Advice::new(
            NetUnitProfit,
            Positive,
            "Each customer generates net profit. Expansion can proceed under control.",
        )
    });

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RatioValue;
    use crate::unit_economics::metrics::compute;
    use rust_decimal_macros::dec;

    #[test]
    fn test_highly_viable() {
        let ue = compute(dec!(50), dec!(200), dec!(0.05), dec!(0.8));
        assert_eq!(
            classify_viability(&ue),
            (Verdict::HighlyViable, Severity::Success)
        );
    }

    #[test]
    fn test_acceptable_early_stage() {
        // contribution = 100 * 0.4 = 40; LTV = 40 / 0.1 = 400; LTV/CAC = 2.0; payback = 5
        let ue = compute(dec!(100), dec!(200), dec!(0.1), dec!(0.4));
        assert_eq!(
            classify_viability(&ue),
            (Verdict::AcceptableEarlyStage, Severity::Warning)
        );
    }

    #[test]
    fn test_high_risk_when_churn_too_high() {
        let ue = compute(dec!(100), dec!(200), dec!(0.2), dec!(0.9));
        assert_eq!(classify_viability(&ue).0, Verdict::HighRisk);
    }

    #[test]
    fn test_verdict_uses_rounded_ratio() {
        // LTV = 40 * 0.75 / 0.05 = 600; 600 / 200.27 = 2.99595..., displayed as 3.00
        let ue = compute(dec!(40), dec!(200.27), dec!(0.05), dec!(0.75));
        assert_eq!(ue.ltv_to_cac, RatioValue::Finite(dec!(3)));
        assert!(!ue.precise.ltv_to_cac.at_least(dec!(3)));
        assert_eq!(classify_viability(&ue).0, Verdict::HighlyViable);
    }

    #[test]
    fn test_recommendation_order_and_levels() {
        let ue = compute(dec!(50), dec!(200), dec!(0.05), dec!(0.8));
        let recs = recommendations(&ue);
        let metrics: Vec<UnitMetric> = recs.iter().map(|a| a.metric).collect();
        assert_eq!(
            metrics,
            vec![
                UnitMetric::LtvToCac,
                UnitMetric::Payback,
                UnitMetric::Churn,
                UnitMetric::GrossMargin,
                UnitMetric::NetUnitProfit
            ]
        );
        assert!(recs.iter().all(|a| a.level == AdviceLevel::Positive));
    }

    #[test]
    fn test_critical_recommendations() {
        // LTV = 10 * 0.3 / 0.2 = 15; CAC = 100
        let ue = compute(dec!(10), dec!(100), dec!(0.2), dec!(0.3));
        let recs = recommendations(&ue);
        assert!(recs.iter().all(|a| a.level == AdviceLevel::Critical));
    }

    #[test]
    fn test_unbounded_payback_is_critical() {
        let ue = compute(Decimal::ZERO, dec!(100), dec!(0.05), dec!(0.8));
        let recs = recommendations(&ue);
        assert_eq!(recs[1].level, AdviceLevel::Critical);
    }
}
