use serde_json::Value;

/// Headline field per command, in priority order.
const PRIORITY_KEYS: [&str; 14] = [
    "break_even_units",
    "expected_profit",
    "verdict",
    "score",
    "runway_months",
    "best_scenario",
    "som",
    "ending_cash",
    "ltv_to_cac",
    "summary",
    "common_kpis",
    "kpi_summary",
    "ratios",
    "rows",
];

/// Print just the key answer value from the output.
///
/// Looks through the result (and one level of nested objects, so
/// `metrics.ltv_to_cac` and `assessment.score` are found) for the first
/// priority key, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = find_key(map, key) {
                println!("{}", format_minimal(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn find_key<'a>(map: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
        return Some(val);
    }
    map.values()
        .filter_map(Value::as_object)
        .find_map(|nested| nested.get(key).filter(|v| !v.is_null()))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
