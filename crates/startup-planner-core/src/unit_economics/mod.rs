pub mod metrics;
pub mod viability;
