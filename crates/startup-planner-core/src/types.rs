use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g., 3.2x LTV/CAC)
pub type Multiple = Decimal;

/// A ratio that may be unbounded when its denominator is zero.
///
/// `Infinite` orders above every finite value, so threshold checks such as
/// `value >= RatioValue::from(dec!(1.5))` behave as expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatioValue {
    Finite(Decimal),
    Infinite,
}

impl RatioValue {
    pub const ZERO: RatioValue = RatioValue::Finite(Decimal::ZERO);

    /// `numerator / denominator`, or zero when the denominator is zero.
    pub fn or_zero(numerator: Decimal, denominator: Decimal) -> Self {
        if denominator.is_zero() {
            RatioValue::ZERO
        } else {
            RatioValue::Finite(numerator / denominator)
        }
    }

    /// `numerator / denominator`, or +∞ when the denominator is zero.
    pub fn or_infinite(numerator: Decimal, denominator: Decimal) -> Self {
        if denominator.is_zero() {
            RatioValue::Infinite
        } else {
            RatioValue::Finite(numerator / denominator)
        }
    }

    pub fn finite(&self) -> Option<Decimal> {
        match self {
            RatioValue::Finite(v) => Some(*v),
            RatioValue::Infinite => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, RatioValue::Infinite)
    }

    pub fn at_least(&self, threshold: Decimal) -> bool {
        *self >= RatioValue::Finite(threshold)
    }

    pub fn at_most(&self, threshold: Decimal) -> bool {
        *self <= RatioValue::Finite(threshold)
    }

    pub fn round_dp(&self, dp: u32) -> Self {
        match self {
            RatioValue::Finite(v) => RatioValue::Finite(v.round_dp(dp)),
            RatioValue::Infinite => RatioValue::Infinite,
        }
    }
}

impl Default for RatioValue {
    fn default() -> Self {
        RatioValue::ZERO
    }
}

impl From<Decimal> for RatioValue {
    fn from(value: Decimal) -> Self {
        RatioValue::Finite(value)
    }
}

impl fmt::Display for RatioValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioValue::Finite(v) => write!(f, "{v}"),
            RatioValue::Infinite => write!(f, "Infinity"),
        }
    }
}

impl FromStr for RatioValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "infinity" | "inf" | "+inf" | "+infinity" | "∞" => Ok(RatioValue::Infinite),
            _ => Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map(RatioValue::Finite)
                .map_err(|e| format!("invalid ratio value '{trimmed}': {e}")),
        }
    }
}

impl Serialize for RatioValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RatioValue::Finite(v) => Serialize::serialize(v, serializer),
            RatioValue::Infinite => serializer.serialize_str("Infinity"),
        }
    }
}

struct RatioValueVisitor;

impl<'de> Visitor<'de> for RatioValueVisitor {
    type Value = RatioValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal number, a decimal string, or \"Infinity\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RatioValue, E> {
        RatioValue::from_str(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RatioValue, E> {
        Ok(RatioValue::Finite(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RatioValue, E> {
        Ok(RatioValue::Finite(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RatioValue, E> {
        if v.is_infinite() && v.is_sign_positive() {
            return Ok(RatioValue::Infinite);
        }
        Decimal::try_from(v)
            .map(RatioValue::Finite)
            .map_err(|e| E::custom(format!("invalid ratio value {v}: {e}")))
    }
}

impl<'de> Deserialize<'de> for RatioValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RatioValueVisitor)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    envelope(
        methodology,
        assumptions,
        warnings,
        elapsed_us,
        "rust_decimal_128bit",
        result,
    )
}

/// Same as [`with_metadata`] for results computed in floating point.
pub fn with_metadata_f64<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    envelope(methodology, assumptions, warnings, elapsed_us, "ieee754_f64", result)
}

fn envelope<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    precision: &str,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: precision.to_string(),
        },
    }
}
