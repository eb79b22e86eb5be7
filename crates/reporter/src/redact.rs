//! Redaction of sensitive keys in multi-valued parameter maps.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Value};

/// Marker written in place of redacted values
pub const FILTERED: &str = "[FILTERED]";

/// Multi-valued key map (headers, query params, form fields), sorted by key
pub type Params = BTreeMap<String, Vec<String>>;

/// Return a copy of `values` where every key matching `pattern` carries the
/// single value [`FILTERED`]. The input is left untouched.
pub fn filter_params(pattern: &Regex, values: &Params) -> Params {
    values
        .iter()
        .map(|(key, vals)| {
            if pattern.is_match(key) {
                (key.clone(), vec![FILTERED.to_string()])
            } else {
                (key.clone(), vals.clone())
            }
        })
        .collect()
}

/// Single values become scalars, everything else stays a list
pub fn flatten_values(values: &Params) -> Map<String, Value> {
    values
        .iter()
        .map(|(key, vals)| {
            let value = match vals.as_slice() {
                [single] => Value::String(single.clone()),
                many => Value::from(many.to_vec()),
            };
            (key.clone(), value)
        })
        .collect()
}

/// `application/x-www-form-urlencoded` rendering, keys in sorted order
pub fn encode_query(values: &Params) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, vals) in values {
        for val in vals {
            serializer.append_pair(key, val);
        }
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &[&str])]) -> Params {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_filter_params_returns_redacted_copy() {
        let pattern = Regex::new("password|secret|token").unwrap();
        let original = params(&[
            ("user", &["ada"]),
            ("password", &["hunter2"]),
            ("api_token", &["a", "b"]),
        ]);

        let filtered = filter_params(&pattern, &original);

        assert_eq!(filtered["user"], vec!["ada"]);
        assert_eq!(filtered["password"], vec![FILTERED]);
        assert_eq!(filtered["api_token"], vec![FILTERED]);
        // caller's map is not touched
        assert_eq!(original["password"], vec!["hunter2"]);
    }

    #[test]
    fn test_flatten_values() {
        let flat = flatten_values(&params(&[("one", &["1"]), ("many", &["a", "b"]), ("none", &[])]));
        assert_eq!(flat["one"], json!("1"));
        assert_eq!(flat["many"], json!(["a", "b"]));
        assert_eq!(flat["none"], json!([]));
    }

    #[test]
    fn test_encode_query_sorted() {
        let query = encode_query(&params(&[("b", &["2"]), ("a", &["x y", "z"])]));
        assert_eq!(query, "a=x+y&a=z&b=2");
    }
}
