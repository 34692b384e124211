use serde_json::Value;

/// Parses a list cell. Accepts a JSON array (`["a","b"]`), a single bare
/// value, or an empty / "none" cell.
pub fn parse_list(cell: &str) -> Vec<String> {
    let s = cell.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    if s.starts_with('[') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(s) {
            return items.iter().filter_map(scalar_to_string).collect();
        }
    }
    vec![s.to_string()]
}

/// Missing or unparsable numbers default to zero.
pub fn parse_number(cell: &str) -> f64 {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn list_from_json(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(s)) => parse_list(s),
        _ => Vec::new(),
    }
}

pub fn number_from_json(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_number(s),
        _ => 0.0,
    }
}

pub fn string_from_json(value: Option<&Value>) -> Option<String> {
    value.and_then(scalar_to_string).filter(|s| !s.trim().is_empty())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_list_variants() {
        assert_eq!(parse_list(r#"["italian", "universal"]"#), vec!["italian", "universal"]);
        assert_eq!(parse_list("lunch"), vec!["lunch"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list("None").is_empty());
        // Broken JSON is kept as a single bare value
        assert_eq!(parse_list("[oops"), vec!["[oops"]);
    }

    #[test]
    fn test_parse_number_defaults_to_zero() {
        assert_eq!(parse_number("12.5"), 12.5);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("n/a"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
    }

    #[test]
    fn test_json_normalization() {
        let row = json!({ "cuisine": ["thai"], "allergens": "[\"soy\"]", "protein": "7", "kcal": 120 });
        assert_eq!(list_from_json(row.get("cuisine")), vec!["thai"]);
        assert_eq!(list_from_json(row.get("allergens")), vec!["soy"]);
        assert!(list_from_json(row.get("missing")).is_empty());
        assert_eq!(number_from_json(row.get("protein")), 7.0);
        assert_eq!(number_from_json(row.get("kcal")), 120.0);
        assert_eq!(number_from_json(row.get("fat")), 0.0);
    }
}
