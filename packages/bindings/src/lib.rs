use napi::Result as NapiResult;
use napi_derive::napi;

use startup_planner_core as planner;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Break-even & Monte Carlo
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_break_even(input_json: String) -> NapiResult<String> {
    let input: planner::break_even::BreakEvenInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::break_even::analyze_break_even(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn run_profit_simulation(input_json: String) -> NapiResult<String> {
    let input: planner::monte_carlo::ProfitSimulationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::monte_carlo::run_profit_simulation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Ratios & unit economics
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_financial_health(input_json: String) -> NapiResult<String> {
    let input: planner::ratios::statement::FinancialStatementInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        planner::ratios::statement::analyze_financial_health(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_unit_economics(input_json: String) -> NapiResult<String> {
    let input: planner::unit_economics::metrics::UnitEconomicsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        planner::unit_economics::metrics::analyze_unit_economics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn forecast_cash_flow(input_json: String) -> NapiResult<String> {
    let input: planner::projection::cash_flow::CashFlowInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::projection::cash_flow::forecast_cash_flow(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    let input: planner::projection::scenario::ScenarioComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::projection::scenario::compare_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_pmf(input_json: String) -> NapiResult<String> {
    let input: planner::strategy::pmf::PmfInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::strategy::pmf::analyze_pmf(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_growth(input_json: String) -> NapiResult<String> {
    let input: planner::strategy::growth::GrowthInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::strategy::growth::analyze_growth(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn estimate_market_size(input_json: String) -> NapiResult<String> {
    let input: planner::strategy::market_size::MarketSizeInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        planner::strategy::market_size::estimate_market_size(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// KPI tracking
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_kpi(input_json: String) -> NapiResult<String> {
    let input: planner::kpi::KpiAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::kpi::analyze_kpi(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_kpi_targets(input_json: String) -> NapiResult<String> {
    let input: planner::kpi::KpiTargetInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::kpi::compare_to_targets(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[napi]
pub fn build_business_report(input_json: String) -> NapiResult<String> {
    let input: planner::reports::BusinessReportInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::reports::build_business_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_financial_report(input_json: String) -> NapiResult<String> {
    let input: planner::reports::FinancialReportInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = planner::reports::build_financial_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
