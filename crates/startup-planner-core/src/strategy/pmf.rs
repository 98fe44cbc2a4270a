use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

use super::{check_fraction, Action};
use crate::types::*;
use crate::{PlannerError, PlannerResult};

const HUNDRED: Decimal = dec!(100);

/// Survey and usage signals for a product-market-fit check. All shares are
/// fractions in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmfInput {
    /// Share of users still active after 90 days
    pub retention_90d: Rate,
    /// Share of users returning regularly
    pub repeat_usage: Rate,
    /// "Very disappointed" answers to the Sean Ellis question
    pub very_disappointed: Rate,
    /// "Somewhat disappointed" answers
    pub somewhat_disappointed: Rate,
    pub organic_revenue_growth: Rate,
    pub ltv_cac_ratio: Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PmfVerdict {
    Strong,
    Partial,
    Weak,
}

impl fmt::Display for PmfVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Strong => "Strong PMF",
            Self::Partial => "Partial PMF",
            Self::Weak => "Weak PMF",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PmfStage {
    #[serde(rename = "Scale-ready")]
    ScaleReady,
    Optimize,
    Fix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmfActionKind {
    ImproveRetention,
    ClarifyCustomerProfile,
    ImproveUnitEconomics,
    BoostOrganicGrowth,
    ReadyToScale,
}

impl PmfActionKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::ImproveRetention => {
                "Strengthen core value and onboarding to lift retention."
            }
            Self::ClarifyCustomerProfile => {
                "Sharpen the ideal customer profile and the main pain point."
            }
            Self::ImproveUnitEconomics => "Optimise pricing and packaging, or cut CAC.",
            Self::BoostOrganicGrowth => {
                "Push referral, word-of-mouth and usage loops."
            }
            Self::ReadyToScale => {
                "Ready to start scaling channel by channel on a controlled budget."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmfAssessment {
    pub value_fit: Decimal,
    pub emotional_fit: Decimal,
    pub economic_fit: Decimal,
    /// Share of respondents who would not miss the product
    pub not_disappointed: Rate,
    /// Weighted 0-100 composite of the three pillars
    pub score: Decimal,
    pub verdict: PmfVerdict,
    pub stage: PmfStage,
    pub actions: Vec<Action<PmfActionKind>>,
}

/// Score product-market fit on value, emotional and economic pillars.
///
/// - value fit = (0.6 retention + 0.4 repeat usage) x 100
/// - emotional fit = very disappointed x 100
/// - economic fit = (0.5 organic growth + 0.5 min(LTV/CAC / 3, 1)) x 100
/// - score = 0.40 value + 0.35 emotional + 0.25 economic
pub fn evaluate_pmf(input: &PmfInput) -> PmfAssessment {
    let value_fit = (dec!(0.6) * input.retention_90d + dec!(0.4) * input.repeat_usage) * HUNDRED;
    let emotional_fit = input.very_disappointed * HUNDRED;
    let not_disappointed =
        (Decimal::ONE - input.very_disappointed - input.somewhat_disappointed).max(Decimal::ZERO);
    let ltv_cac_component = (input.ltv_cac_ratio / dec!(3)).min(Decimal::ONE);
    let economic_fit =
        (dec!(0.5) * input.organic_revenue_growth + dec!(0.5) * ltv_cac_component) * HUNDRED;

    let score = dec!(0.4) * value_fit + dec!(0.35) * emotional_fit + dec!(0.25) * economic_fit;

    let (verdict, stage) =
        if emotional_fit >= dec!(40) && value_fit >= dec!(60) && economic_fit >= dec!(60) {
            (PmfVerdict::Strong, PmfStage::ScaleReady)
        } else if value_fit >= dec!(50) && emotional_fit >= dec!(30) {
            (PmfVerdict::Partial, PmfStage::Optimize)
        } else {
            (PmfVerdict::Weak, PmfStage::Fix)
        };

    let mut kinds = Vec::new();
    if input.retention_90d < dec!(0.4) {
        kinds.push(PmfActionKind::ImproveRetention);
    }
    if input.very_disappointed < dec!(0.4) {
        kinds.push(PmfActionKind::ClarifyCustomerProfile);
    }
    if input.ltv_cac_ratio < dec!(3) {
        kinds.push(PmfActionKind::ImproveUnitEconomics);
    }
    if input.organic_revenue_growth < dec!(0.05) {
        kinds.push(PmfActionKind::BoostOrganicGrowth);
    }
    if kinds.is_empty() {
        kinds.push(PmfActionKind::ReadyToScale);
    }

    PmfAssessment {
        value_fit,
        emotional_fit,
        economic_fit,
        not_disappointed,
        score,
        verdict,
        stage,
        actions: kinds
            .into_iter()
            .map(|kind| Action {
                kind,
                message: kind.message().to_string(),
            })
            .collect(),
    }
}

pub fn analyze_pmf(input: &PmfInput) -> PlannerResult<ComputationOutput<PmfAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    check_fraction("retention_90d", input.retention_90d)?;
    check_fraction("repeat_usage", input.repeat_usage)?;
    check_fraction("very_disappointed", input.very_disappointed)?;
    check_fraction("somewhat_disappointed", input.somewhat_disappointed)?;
    check_fraction("organic_revenue_growth", input.organic_revenue_growth)?;
    if input.ltv_cac_ratio < Decimal::ZERO {
        return Err(PlannerError::invalid(
            "ltv_cac_ratio",
            "LTV/CAC cannot be negative.",
        ));
    }

    if input.very_disappointed + input.somewhat_disappointed > Decimal::ONE {
        warnings.push(
            "Disappointment shares add up to more than 100%; 'not disappointed' is clamped to 0."
                .into(),
        );
    }

    let assessment = evaluate_pmf(input);
    debug!(score = %assessment.score, verdict = %assessment.verdict, "pmf evaluated");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Product-Market Fit (value / emotional / economic)",
        &serde_json::json!({
            "weights": { "value": "0.40", "emotional": "0.35", "economic": "0.25" },
            "strong": "emotional >= 40, value >= 60, economic >= 60",
            "partial": "value >= 50, emotional >= 30",
        }),
        warnings,
        elapsed,
        assessment,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn survey() -> PmfInput {
        PmfInput {
            retention_90d: dec!(0.4),
            repeat_usage: dec!(0.5),
            very_disappointed: dec!(0.3),
            somewhat_disappointed: dec!(0.4),
            organic_revenue_growth: dec!(0.1),
            ltv_cac_ratio: dec!(2.5),
        }
    }

    #[test]
    fn test_pillar_scores() {
        let a = evaluate_pmf(&survey());
        assert_eq!(a.value_fit, dec!(44));
        assert_eq!(a.emotional_fit, dec!(30));
        assert_eq!(a.economic_fit.round_dp(4), dec!(46.6667));
        assert_eq!(a.not_disappointed, dec!(0.3));
        // 0.4 * 44 + 0.35 * 30 + 0.25 * 46.667
        assert_eq!(a.score.round_dp(4), dec!(39.7667));
    }

    #[test]
    fn test_weak_fit_actions() {
        let a = evaluate_pmf(&survey());
        assert_eq!(a.verdict, PmfVerdict::Weak);
        assert_eq!(a.stage, PmfStage::Fix);
        let kinds: Vec<PmfActionKind> = a.actions.iter().map(|x| x.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PmfActionKind::ClarifyCustomerProfile,
                PmfActionKind::ImproveUnitEconomics
            ]
        );
    }

    #[test]
    fn test_strong_fit_is_ready_to_scale() {
        let a = evaluate_pmf(&PmfInput {
            retention_90d: dec!(0.8),
            repeat_usage: dec!(0.7),
            very_disappointed: dec!(0.5),
            somewhat_disappointed: dec!(0.3),
            organic_revenue_growth: dec!(0.3),
            ltv_cac_ratio: dec!(4),
        });
        assert_eq!(a.value_fit, dec!(76));
        assert_eq!(a.economic_fit, dec!(65));
        assert_eq!(a.score, dec!(64.15));
        assert_eq!(a.verdict, PmfVerdict::Strong);
        assert_eq!(a.stage, PmfStage::ScaleReady);
        assert_eq!(a.actions.len(), 1);
        assert_eq!(a.actions[0].kind, PmfActionKind::ReadyToScale);
    }

    #[test]
    fn test_partial_fit() {
        let mut input = survey();
        input.retention_90d = dec!(0.6);
        input.repeat_usage = dec!(0.5);
        // value = (0.36 + 0.20) * 100 = 56; emotional = 30
        let a = evaluate_pmf(&input);
        assert_eq!(a.verdict, PmfVerdict::Partial);
        assert_eq!(a.stage, PmfStage::Optimize);
    }

    #[test]
    fn test_shares_outside_unit_interval_rejected() {
        let mut input = survey();
        input.retention_90d = dec!(1.2);
        assert!(analyze_pmf(&input).is_err());
    }

    #[test]
    fn test_overlapping_shares_warn() {
        let mut input = survey();
        input.very_disappointed = dec!(0.7);
        input.somewhat_disappointed = dec!(0.5);
        let out = analyze_pmf(&input).unwrap();
        assert_eq!(out.result.not_disappointed, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }
}
