//! Probe flattening
//!
//! Turns a probe tree into a sorted map of lower-cased dot paths to scalar
//! values (`streams.0.tags.language -> "eng"`), which is the shape the
//! equivalence checks compare.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Number;

use crate::media::{MediaProbe, ProbeValue};

/// A scalar leaf of a flattened probe.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    /// An empty map or list.
    None,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl FlatValue {
    /// Numeric reading of the value; numeric strings are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlatValue::Number(n) => n.as_f64(),
            FlatValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlatValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatValue::None => write!(f, "None"),
            FlatValue::Null => write!(f, "null"),
            FlatValue::Bool(b) => write!(f, "{b}"),
            FlatValue::Number(n) => write!(f, "{n}"),
            FlatValue::String(s) => write!(f, "{s}"),
        }
    }
}

/// Flattened probe, ordered by path.
pub type FlatFacts = BTreeMap<String, FlatValue>;

/// Flattens a whole probe (`format.*` and `streams.N.*`).
pub fn flatten(probe: &MediaProbe) -> FlatFacts {
    flatten_value(&probe.to_tree())
}

/// Flattens any probe value; a scalar root is stored under the empty path.
pub fn flatten_value(value: &ProbeValue) -> FlatFacts {
    let mut facts = FlatFacts::new();
    flatten_into(value, String::new(), &mut facts);
    facts
}

fn flatten_into(value: &ProbeValue, path: String, facts: &mut FlatFacts) {
    match value {
        ProbeValue::Map(fields) if fields.is_empty() => {
            facts.insert(path, FlatValue::None);
        }
        ProbeValue::List(items) if items.is_empty() => {
            facts.insert(path, FlatValue::None);
        }
        ProbeValue::Map(fields) => {
            for (key, child) in fields {
                flatten_into(child, join(&path, &key.to_lowercase()), facts);
            }
        }
        ProbeValue::List(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, join(&path, &index.to_string()), facts);
            }
        }
        ProbeValue::Null => {
            facts.insert(path, FlatValue::Null);
        }
        ProbeValue::Bool(b) => {
            facts.insert(path, FlatValue::Bool(*b));
        }
        ProbeValue::Number(n) => {
            facts.insert(path, FlatValue::Number(n.clone()));
        }
        ProbeValue::String(s) => {
            facts.insert(path, FlatValue::String(s.clone()));
        }
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn probe(value: serde_json::Value) -> MediaProbe {
        MediaProbe::from_json(value).unwrap()
    }

    #[test]
    fn test_paths_are_dotted_indexed_and_lowercased() {
        let facts = flatten(&probe(json!({
            "format": {"duration": "120.000000", "nb_streams": 1, "tags": {"ENCODER": "Lavf"}},
            "streams": [{"codec_type": "video", "tags": {"language": "eng", "DURATION": "00:02:00.000000000"}}]
        })));

        assert_eq!(
            facts.get("format.duration"),
            Some(&FlatValue::String("120.000000".to_string()))
        );
        assert_eq!(facts.get("format.nb_streams").map(ToString::to_string), Some("1".to_string()));
        assert!(facts.contains_key("format.tags.encoder"));
        assert!(facts.contains_key("streams.0.tags.duration"));
        assert_eq!(
            facts.get("streams.0.tags.language").and_then(FlatValue::as_str),
            Some("eng")
        );
    }

    #[test]
    fn test_empty_containers_become_none() {
        let facts = flatten(&probe(json!({
            "format": {"tags": {}},
            "streams": [{"side_data_list": [], "disposition": {"default": 1}}]
        })));

        assert_eq!(facts.get("format.tags"), Some(&FlatValue::None));
        assert_eq!(facts.get("streams.0.side_data_list"), Some(&FlatValue::None));
        assert!(facts.contains_key("streams.0.disposition.default"));

        let no_streams = flatten(&probe(json!({"format": {"duration": "1.0"}, "streams": []})));
        assert_eq!(no_streams.get("streams"), Some(&FlatValue::None));
    }

    #[test]
    fn test_numeric_strings_are_not_coerced() {
        let facts = flatten(&probe(json!({"format": {"size": "1000", "probe_score": 100}})));
        assert_eq!(facts["format.size"], FlatValue::String("1000".to_string()));
        assert!(matches!(facts["format.probe_score"], FlatValue::Number(_)));
        assert_eq!(facts["format.size"].as_f64(), Some(1000.0));
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let tree = json!({
            "streams": [{"b": 1, "a": {"z": [1, 2], "y": null}}],
            "format": {"filename": "x.mkv"}
        });
        let first = flatten(&probe(tree.clone()));
        let second = flatten(&probe(tree));
        assert_eq!(first, second);

        let keys: Vec<&String> = first.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(first.get("streams.0.a.y"), Some(&FlatValue::Null));
        assert!(first.contains_key("streams.0.a.z.1"));
    }

    #[test]
    fn test_flatten_value_scalar_root() {
        let facts = flatten_value(&ProbeValue::String("x".to_string()));
        assert_eq!(facts.get(""), Some(&FlatValue::String("x".to_string())));
    }
}
