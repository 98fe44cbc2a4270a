use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::{check_fraction, Action};
use crate::types::*;
use crate::PlannerResult;

const HUNDRED: Decimal = dec!(100);
/// Floor on CAC growth so efficiency stays defined when CAC is flat.
const MIN_CAC_GROWTH: Decimal = dec!(0.01);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthInput {
    /// Monthly revenue growth
    pub revenue_growth_rate: Rate,
    /// Share of growth coming from organic channels
    pub organic_ratio: Rate,
    pub cac_growth_rate: Rate,
    /// 0 = no pressure from burn, 1 = severe
    pub burn_rate_pressure: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthStage {
    Scale,
    Optimize,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthActionKind {
    BoostOrganic,
    OptimizeFunnel,
    ControlBurn,
    Stable,
}

impl GrowthActionKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::BoostOrganic => "Grow referral and organic acquisition.",
            Self::OptimizeFunnel => "CAC is growing faster than revenue; optimise the funnel.",
            Self::ControlBurn => "Bring burn rate under control before scaling.",
            Self::Stable => "Growth strategy is stable.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthAssessment {
    /// (0.6 revenue growth + 0.4 organic share) x 100
    pub quality: Decimal,
    /// min(revenue growth / CAC growth, 1) x 100
    pub efficiency: Decimal,
    /// (1 - burn pressure) x 100
    pub risk_control: Decimal,
    pub score: Decimal,
    pub stage: GrowthStage,
    pub actions: Vec<Action<GrowthActionKind>>,
}

/// Score a growth strategy: 40% quality, 40% efficiency, 20% risk control.
pub fn evaluate_growth(input: &GrowthInput) -> GrowthAssessment {
    let quality =
        (dec!(0.6) * input.revenue_growth_rate + dec!(0.4) * input.organic_ratio) * HUNDRED;
    let efficiency = (input.revenue_growth_rate / input.cac_growth_rate.max(MIN_CAC_GROWTH))
        .min(Decimal::ONE)
        * HUNDRED;
    let risk_control = (Decimal::ONE - input.burn_rate_pressure) * HUNDRED;
    let score = dec!(0.4) * quality + dec!(0.4) * efficiency + dec!(0.2) * risk_control;

    let stage = if score >= dec!(70) {
        GrowthStage::Scale
    } else if score >= dec!(50) {
        GrowthStage::Optimize
    } else {
        GrowthStage::Hold
    };

    let mut kinds = Vec::new();
    if input.organic_ratio < dec!(0.5) {
        kinds.push(GrowthActionKind::BoostOrganic);
    }
    if input.cac_growth_rate > input.revenue_growth_rate {
        kinds.push(GrowthActionKind::OptimizeFunnel);
    }
    if input.burn_rate_pressure > dec!(0.6) {
        kinds.push(GrowthActionKind::ControlBurn);
    }
    if kinds.is_empty() {
        kinds.push(GrowthActionKind::Stable);
    }

    GrowthAssessment {
        quality,
        efficiency,
        risk_control,
        score,
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

pub fn analyze_growth(input: &GrowthInput) -> PlannerResult<ComputationOutput<GrowthAssessment>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    check_fraction("revenue_growth_rate", input.revenue_growth_rate)?;
    check_fraction("organic_ratio", input.organic_ratio)?;
    check_fraction("cac_growth_rate", input.cac_growth_rate)?;
    check_fraction("burn_rate_pressure", input.burn_rate_pressure)?;

    let assessment = evaluate_growth(input);
    debug!(score = %assessment.score, stage = ?assessment.stage, "growth strategy evaluated");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Growth Strategy Score (quality / efficiency / risk)",
        &serde_json::json!({
            "weights": { "quality": "0.4", "efficiency": "0.4", "risk_control": "0.2" },
            "cac_growth_floor": MIN_CAC_GROWTH.to_string(),
            "stages": "Scale >= 70, Optimize >= 50, else Hold",
        }),
        warnings,
        elapsed,
        assessment,
    ))
}
