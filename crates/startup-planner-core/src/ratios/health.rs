use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::statement::RatioSet;
use crate::types::RatioValue;

/// Nominal maximum of the health score. Four categories at two points each
/// reach 8; the scale is kept at 10 for display.
pub const HEALTH_SCORE_SCALE: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthCategory {
    Profitability,
    Liquidity,
    #[serde(rename = "Leverage / Risk")]
    LeverageRisk,
    #[serde(rename = "Return on Capital")]
    ReturnOnCapital,
}

impl fmt::Display for HealthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Profitability => "Profitability",
            Self::Liquidity => "Liquidity",
            Self::LeverageRisk => "Leverage / Risk",
            Self::ReturnOnCapital => "Return on Capital",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthLabel {
    Strong,
    Acceptable,
    Weak,
}

impl HealthLabel {
    pub fn points(&self) -> u8 {
        match self {
            Self::Strong => 2,
            Self::Acceptable => 1,
            Self::Weak => 0,
        }
    }
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Strong => "Strong",
            Self::Acceptable => "Acceptable",
            Self::Weak => "Weak",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssessment {
    pub category: HealthCategory,
    pub label: HealthLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub categories: Vec<CategoryAssessment>,
    pub score: u8,
    pub max_score: u8,
}

impl HealthAssessment {
    pub fn label_for(&self, category: HealthCategory) -> Option<HealthLabel> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.label)
    }
}

/// One cutoff: the ratio must reach a floor or stay under a ceiling.
#[derive(Clone, Copy)]
enum Bound {
    AtLeast(Decimal),
    AtMost(Decimal),
}

impl Bound {
    fn met(self, value: RatioValue) -> bool {
        match self {
            Bound::AtLeast(floor) => value.at_least(floor),
            Bound::AtMost(ceiling) => value.at_most(ceiling),
        }
    }
}

/// Cutoffs for the two ratios graded together in one category.
struct Tier {
    first: Bound,
    second: Bound,
}

impl Tier {
    fn met(&self, a: RatioValue, b: RatioValue) -> bool {
        self.first.met(a) && self.second.met(b)
    }
}

fn grade(a: RatioValue, b: RatioValue, strong: Tier, acceptable: Tier) -> HealthLabel {
    if strong.met(a, b) {
        HealthLabel::Strong
    } else if acceptable.met(a, b) {
        HealthLabel::Acceptable
    } else {
        HealthLabel::Weak
    }
}

/// Score financial health across four categories.
///
/// Each category is graded independently against fixed two-tier cutoffs:
///
/// | Category | Strong | Acceptable |
/// |---|---|---|
/// | Profitability | GM >= 0.40, cost/revenue <= 0.70 | GM >= 0.25, cost/revenue <= 0.90 |
/// | Liquidity | current >= 1.5, cash >= 0.5 | current >= 1.0, cash >= 0.25 |
/// | Leverage / Risk | D/E <= 1.0, debt ratio <= 0.5 | D/E <= 2.0, debt ratio <= 0.7 |
/// | Return on Capital | ROE >= 0.15, ROA >= 0.05 | ROE >= 0.05, ROA >= 0.02 |
pub fn assess_health(ratios: &RatioSet) -> HealthAssessment {
    use Bound::{AtLeast, AtMost};

    let profitability = grade(
        ratios.gross_margin,
        ratios.cost_to_revenue,
        Tier {
            first: AtLeast(dec!(0.4)),
            second: AtMost(dec!(0.7)),
        },
        Tier {
            first: AtLeast(dec!(0.25)),
            second: AtMost(dec!(0.9)),
        },
    );

    let liquidity = grade(
        ratios.current_ratio,
        ratios.cash_ratio,
        Tier {
            first: AtLeast(dec!(1.5)),
            second: AtLeast(dec!(0.5)),
        },
        Tier {
            first: AtLeast(dec!(1.0)),
            second: AtLeast(dec!(0.25)),
        },
    );

    let leverage = grade(
        ratios.debt_to_equity,
        ratios.debt_ratio,
        Tier {
            first: AtMost(dec!(1.0)),
            second: AtMost(dec!(0.5)),
        },
        Tier {
            first: AtMost(dec!(2.0)),
            second: AtMost(dec!(0.7)),
        },
    );

    let returns = grade(
        ratios.roe,
        ratios.roa,
        Tier {
            first: AtLeast(dec!(0.15)),
            second: AtLeast(dec!(0.05)),
        },
        Tier {
            first: AtLeast(dec!(0.05)),
            second: AtLeast(dec!(0.02)),
        },
    );

    let categories = vec![
        CategoryAssessment {
            category: HealthCategory::Profitability,
            label: profitability,
        },
        CategoryAssessment {
            category: HealthCategory::Liquidity,
            label: liquidity,
        },
        CategoryAssessment {
            category: HealthCategory::LeverageRisk,
            label: leverage,
        },
        CategoryAssessment {
            category: HealthCategory::ReturnOnCapital,
            label: returns,
        },
    ];
    let score = categories.iter().map(|c| c.label.points()).sum();

    HealthAssessment {
        categories,
        score,
        max_score: HEALTH_SCORE_SCALE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn strong_ratios() -> RatioSet {
        RatioSet {
            gross_margin: dec!(0.45).into(),
            cost_to_revenue: dec!(0.6).into(),
            current_ratio: dec!(2.0).into(),
            cash_ratio: dec!(0.6).into(),
            debt_to_equity: dec!(0.8).into(),
            debt_ratio: dec!(0.4).into(),
            roe: dec!(0.2).into(),
            roa: dec!(0.08).into(),
            ..RatioSet::default()
        }
    }

    #[test]
    fn test_all_strong_scores_eight() {
        let a = assess_health(&strong_ratios());
        assert!(a.categories.iter().all(|c| c.label == HealthLabel::Strong));
        assert_eq!(a.score, 8);
        assert_eq!(a.max_score, 10);
    }

    #[test]
    fn test_acceptable_tier() {
        let mut r = strong_ratios();
        r.gross_margin = dec!(0.30).into();
        r.cost_to_revenue = dec!(0.85).into();
        let a = assess_health(&r);
        assert_eq!(
            a.label_for(HealthCategory::Profitability),
            Some(HealthLabel::Acceptable)
        );
        assert_eq!(a.score, 7);
    }

    #[test]
    fn test_profitability_needs_both_margin_and_cost_control() {
        let mut r = strong_ratios();
        r.gross_margin = dec!(0.45).into();
        r.cost_to_revenue = dec!(0.95).into();
        assert_eq!(
            assess_health(&r).label_for(HealthCategory::Profitability),
            Some(HealthLabel::Weak)
        );

        r.gross_margin = dec!(0.40).into();
        r.cost_to_revenue = dec!(0.70).into();
        assert_eq!(
            assess_health(&r).label_for(HealthCategory::Profitability),
            Some(HealthLabel::Strong)
        );

        r.gross_margin = dec!(0.2).into();
        r.cost_to_revenue = dec!(0.5).into();
        assert_eq!(
            assess_health(&r).label_for(HealthCategory::Profitability),
            Some(HealthLabel::Weak)
        );
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let mut r = strong_ratios();
        r.current_ratio = dec!(1.5).into();
        r.cash_ratio = dec!(0.5).into();
        r.debt_to_equity = dec!(1.0).into();
        r.debt_ratio = dec!(0.5).into();
        let a = assess_health(&r);
        assert_eq!(a.label_for(HealthCategory::Liquidity), Some(HealthLabel::Strong));
        assert_eq!(
            a.label_for(HealthCategory::LeverageRisk),
            Some(HealthLabel::Strong)
        );
    }

    #[test]
    fn test_unbounded_liquidity_is_strong_unbounded_leverage_is_weak() {
        let mut r = strong_ratios();
        r.current_ratio = RatioValue::Infinite;
        r.cash_ratio = RatioValue::Infinite;
        r.debt_to_equity = RatioValue::Infinite;
        let a = assess_health(&r);
        assert_eq!(a.label_for(HealthCategory::Liquidity), Some(HealthLabel::Strong));
        assert_eq!(a.label_for(HealthCategory::LeverageRisk), Some(HealthLabel::Weak));
    }

    #[test]
    fn test_all_weak() {
        let a = assess_health(&RatioSet {
            cost_to_revenue: dec!(1.2).into(),
            debt_to_equity: dec!(5).into(),
            debt_ratio: dec!(0.9).into(),
            ..RatioSet::default()
        });
        assert!(a.categories.iter().all(|c| c.label == HealthLabel::Weak));
        assert_eq!(a.score, 0);
    }
}
