use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::error::FieldPathError;
use crate::normalize::ResultMap;

/// Dotted path into a normalized mapping, e.g. `case_summary.dispute_reason`.
///
/// Numeric segments index into arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Lenient constructor for paths known at compile time. Empty segments are dropped.
    pub fn new(path: &str) -> Self {
        Self {
            raw: path.to_string(),
            segments: path
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Strict constructor for user-supplied paths.
    pub fn parse(path: &str) -> Result<Self, FieldPathError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(FieldPathError::Empty);
        }
        if path.split('.').any(str::is_empty) {
            return Err(FieldPathError::EmptySegment {
                path: path.to_string(),
            });
        }
        Ok(Self::new(path))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn lookup<'a>(&self, map: &'a ResultMap) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = map.get(first)?;
        for segment in rest {
            current = match current {
                Value::Object(fields) => fields.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Returns the first path whose value is a non-empty string, else `default`.
pub fn first_present_string<'p, I>(map: &ResultMap, paths: I, default: &str) -> String
where
    I: IntoIterator<Item = &'p FieldPath>,
{
    paths
        .into_iter()
        .find_map(|path| {
            path.lookup(map)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
        })
        .unwrap_or(default)
        .to_string()
}

pub fn value_at<'a>(map: &'a ResultMap, path: &str) -> Option<&'a Value> {
    FieldPath::new(path).lookup(map)
}

pub fn string_at<'a>(map: &'a ResultMap, path: &str) -> Option<&'a str> {
    value_at(map, path).and_then(Value::as_str)
}

pub fn bool_at(map: &ResultMap, path: &str) -> Option<bool> {
    value_at(map, path).and_then(Value::as_bool)
}

pub fn number_at(map: &ResultMap, path: &str) -> Option<f64> {
    value_at(map, path).and_then(Value::as_f64)
}

/// True when the value at `path` is a string containing `needle`, or an array
/// holding such a string.
pub fn text_mentions(map: &ResultMap, path: &str, needle: &str) -> bool {
    match value_at(map, path) {
        Some(Value::String(text)) => text.contains(needle),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|text| text.contains(needle)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> ResultMap {
        value.as_object().cloned().unwrap_or_default()
    }

    fn paths(raw: &[&str]) -> Vec<FieldPath> {
        raw.iter().map(|p| FieldPath::new(p)).collect()
    }

    #[test]
    fn first_match_skips_missing_empty_and_non_string() {
        let fields = map(json!({
            "case_summary": {"merchant_analysis": "", "dispute_reason": 7},
            "summary": "fallback summary"
        }));
        let chain = paths(&[
            "case_summary.merchant_analysis",
            "case_summary.dispute_reason",
            "summary",
        ]);
        assert_eq!(
            first_present_string(&fields, &chain, "default"),
            "fallback summary"
        );
        assert_eq!(first_present_string(&map(json!({})), &chain, "default"), "default");
    }

    #[test]
    fn strict_parse_rejects_empty_segments() {
        assert_eq!(FieldPath::parse("  "), Err(FieldPathError::Empty));
        assert!(matches!(
            FieldPath::parse("a..b"),
            Err(FieldPathError::EmptySegment { .. })
        ));
        assert_eq!(FieldPath::parse("a.b").unwrap().as_str(), "a.b");
    }

    #[test]
    fn lookup_walks_arrays_by_index() {
        let fields = map(json!({"sub_agent_results": [{"agent_name": "risk"}]}));
        assert_eq!(
            string_at(&fields, "sub_agent_results.0.agent_name"),
            Some("risk")
        );
        assert_eq!(string_at(&fields, "sub_agent_results.x.agent_name"), None);
    }

    #[test]
    fn mentions_cover_strings_and_arrays() {
        let fields = map(json!({
            "a": "GPS near merchant",
            "b": ["device fingerprint match", 3],
            "c": {"GPS": true}
        }));
        assert!(text_mentions(&fields, "a", "GPS"));
        assert!(text_mentions(&fields, "b", "device"));
        assert!(!text_mentions(&fields, "c", "GPS"));
        assert!(!text_mentions(&fields, "missing", "GPS"));
    }
}
