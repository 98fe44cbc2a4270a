pub mod break_even;
pub mod kpi;
pub mod monte_carlo;
pub mod projection;
pub mod ratios;
pub mod reports;
pub mod strategy;
pub mod unit_economics;

use serde::de::DeserializeOwned;

use crate::input;

pub type CommandResult = Result<serde_json::Value, Box<dyn std::error::Error>>;

/// Typed input from `--input <file>` or piped JSON/YAML, if either was given.
pub(crate) fn load_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_input(path)?));
    }
    match input::stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

pub(crate) fn required<T>(value: Option<T>, flag: &str) -> Result<T, Box<dyn std::error::Error>> {
    value.ok_or_else(|| format!("--{flag} is required (or provide --input)").into())
}
