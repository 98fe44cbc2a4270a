use serde_json::Value;
use std::io::{self, Read};

/// Read a piped command input, or None when stdin is a terminal or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// Piped input may be JSON or YAML, matching what `--input` accepts.
/// JSON is tried first so its error is reported for `{`/`[` documents.
fn parse_piped(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(e) if trimmed.starts_with('{') || trimmed.starts_with('[') => {
            Err(format!("Failed to parse piped input as JSON: {e}").into())
        }
        Err(_) => {
            let value: Value = serde_yaml::from_str(trimmed)
                .map_err(|e| format!("Failed to parse piped input as JSON or YAML: {e}"))?;
            if !value.is_object() {
                return Err("Piped input must be a JSON or YAML mapping".into());
            }
            Ok(Some(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_blank_input_is_none() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_json_and_yaml_give_the_same_value() {
        let from_json = parse_piped(r#"{"fixed_cost": "10000", "price": "50"}"#).unwrap();
        let from_yaml = parse_piped("fixed_cost: \"10000\"\nprice: \"50\"\n").unwrap();
        assert_eq!(from_json, Some(json!({ "fixed_cost": "10000", "price": "50" })));
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_broken_json_is_not_retried_as_yaml() {
        let err = parse_piped(r#"{"price": 50"#).unwrap_err();
        assert!(err.to_string().contains("as JSON:"));
    }

    #[test]
    fn test_plain_scalar_rejected() {
        assert!(parse_piped("hello").is_err());
    }
}
