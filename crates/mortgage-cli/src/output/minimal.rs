use serde_json::Value;

use super::scalar_text;

/// Fields tried in order when printing a single headline value.
const PRIORITY_KEYS: [&str; 6] = [
    "classification",
    "npv",
    "irr_annual",
    "initial_payment",
    "payoff_month",
    "scenarios",
];

/// Print just the key answer value from the output, falling back to the
/// first field of the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return scalar_text(val, "null");
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar_text(val, "null"));
        }
    }

    scalar_text(result_obj, "null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification_wins_for_analysis() {
        let value = json!({ "result": { "classification": "unfavorable", "name": "A" } });
        assert_eq!(headline(&value), "unfavorable");
    }

    #[test]
    fn test_null_npv_skipped() {
        let value = json!({ "result": { "npv": null, "irr_annual": "0.1268" } });
        assert_eq!(headline(&value), "0.1268");
    }

    #[test]
    fn test_fallback_to_first_field() {
        let value = json!({ "result": { "alpha": 1 } });
        assert_eq!(headline(&value), "alpha: 1");
    }
}
