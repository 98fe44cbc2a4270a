pub mod series;
pub mod targets;

pub use series::{analyze_kpi, KpiAnalysisInput, KpiTable};
pub use targets::{compare_to_targets, KpiTargetInput};
