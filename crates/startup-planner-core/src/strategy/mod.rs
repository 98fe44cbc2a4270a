pub mod growth;
pub mod market_size;
pub mod pmf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PlannerError, PlannerResult};

/// A suggested next step, tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action<K> {
    pub kind: K,
    pub message: String,
}

pub(crate) fn check_fraction(field: &str, value: Decimal) -> PlannerResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(PlannerError::invalid(field, "Must be between 0 and 1."));
    }
    Ok(())
}
