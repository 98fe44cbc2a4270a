pub mod cash_flow;
pub mod scenario;

pub use cash_flow::{project, runway, ProjectionRow, ProjectionSeries, ScenarioParams};
