pub mod profit;
pub mod stats;

pub use profit::{run_profit_simulation, simulate, ProfitSimulationInput, ProfitSimulationParams};
