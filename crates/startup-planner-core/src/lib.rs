pub mod error;
pub mod tabular;
pub mod types;

#[cfg(feature = "ratios")]
pub mod ratios;

#[cfg(feature = "unit_economics")]
pub mod unit_economics;

#[cfg(feature = "projection")]
pub mod projection;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

#[cfg(feature = "break_even")]
pub mod break_even;

#[cfg(feature = "strategy")]
pub mod strategy;

#[cfg(feature = "kpi")]
pub mod kpi;

#[cfg(feature = "reports")]
pub mod reports;

pub use error::PlannerError;
pub use types::*;

/// Standard result type for all startup-planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
