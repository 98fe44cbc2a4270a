pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;
use tracing::warn;

/// Print a command's `ComputationOutput` envelope in the chosen format.
///
/// JSON and table output carry the envelope's warnings themselves. CSV and
/// minimal output show only the result on stdout, so the warnings are
/// logged to stderr instead.
pub fn format_output(format: &OutputFormat, value: &Value) {
    if matches!(format, OutputFormat::Csv | OutputFormat::Minimal) {
        for warning in envelope_warnings(value) {
            warn!("{warning}");
        }
    }

    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Warning strings from the envelope; empty for bare values.
fn envelope_warnings(value: &Value) -> Vec<&str> {
    value
        .get("warnings")
        .and_then(Value::as_array)
        .map(|ws| ws.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_warnings_read_from_envelope() {
        let out = json!({
            "result": { "runway_months": "6" },
            "warnings": ["Cash balance turns negative in month 7."],
            "metadata": { "precision": "rust_decimal_128bit" }
        });
        assert_eq!(
            envelope_warnings(&out),
            vec!["Cash balance turns negative in month 7."]
        );
    }

    #[test]
    fn test_bare_values_have_no_warnings() {
        assert!(envelope_warnings(&json!([1, 2, 3])).is_empty());
        assert!(envelope_warnings(&json!({ "result": {} })).is_empty());
    }
}
