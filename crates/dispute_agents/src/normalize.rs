//! Unwrapping of agent payloads into a flat mapping.
//!
//! Agent backends answer either with a structured `response.result` or with a
//! `raw_response` string that encodes `{ "response": "<json>" }`, where the
//! inner string may wrap `{ "result": ... }`. [`normalize`] absorbs both forms
//! and never fails: the worst case is an empty mapping.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::call::AgentCallResult;

pub type ResultMap = Map<String, Value>;

/// Which layer of the payload produced the normalized mapping.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationSource {
    /// `result` field of the doubly-decoded `raw_response`.
    RawResult,
    /// The doubly-decoded `raw_response` itself (it had no `result`).
    RawInner,
    /// `response.result` of the call envelope.
    ResponseResult,
    /// Nothing usable was found.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    fields: ResultMap,
    source: NormalizationSource,
}

impl NormalizedResult {
    pub fn empty() -> Self {
        Self {
            fields: ResultMap::new(),
            source: NormalizationSource::Empty,
        }
    }

    /// Whether normalization found structured data rather than degrading to `{}`.
    pub fn resolved(&self) -> bool {
        self.source != NormalizationSource::Empty
    }

    pub fn source(&self) -> NormalizationSource {
        self.source
    }

    pub fn fields(&self) -> &ResultMap {
        &self.fields
    }

    pub fn into_fields(self) -> ResultMap {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn found(fields: ResultMap, source: NormalizationSource) -> Self {
        Self { fields, source }
    }
}

#[derive(Debug, Error)]
enum RawDecodeError {
    #[error("raw_response is not valid JSON: {0}")]
    Outer(#[source] serde_json::Error),
    #[error("raw_response.response is not valid JSON: {0}")]
    Inner(#[source] serde_json::Error),
}

/// Normalizes a typed call envelope.
pub fn normalize(result: &AgentCallResult) -> NormalizedResult {
    let response_result = result
        .response
        .as_ref()
        .and_then(|response| response.result.as_ref());
    normalize_parts(result.raw_response.as_deref(), response_result)
}

/// Normalizes an arbitrary JSON value shaped (or not) like a call envelope.
pub fn normalize_value(value: &Value) -> NormalizedResult {
    let raw_response = value.get("raw_response").and_then(Value::as_str);
    let response_result = value
        .get("response")
        .and_then(|response| response.get("result"));
    normalize_parts(raw_response, response_result)
}

fn normalize_parts(
    raw_response: Option<&str>,
    response_result: Option<&Value>,
) -> NormalizedResult {
    if let Some(raw) = raw_response.filter(|raw| !raw.is_empty()) {
        match unwrap_raw_response(raw) {
            Ok(Some(found)) => {
                debug!(source = ?found.source, "normalized agent payload from raw_response");
                return found;
            }
            Ok(None) => {}
            Err(err) => warn!("error parsing nested agent response: {err}"),
        }
    }
    fallback(response_result)
}

fn unwrap_raw_response(raw: &str) -> Result<Option<NormalizedResult>, RawDecodeError> {
    let outer: Value = serde_json::from_str(raw).map_err(RawDecodeError::Outer)?;
    let Some(inner_text) = outer
        .get("response")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
    else {
        return Ok(None);
    };

    let inner: Value = serde_json::from_str(inner_text).map_err(RawDecodeError::Inner)?;
    if let Some(Value::Object(result)) = inner.get("result") {
        return Ok(Some(NormalizedResult::found(
            result.clone(),
            NormalizationSource::RawResult,
        )));
    }
    match inner {
        Value::Object(fields) => Ok(Some(NormalizedResult::found(
            fields,
            NormalizationSource::RawInner,
        ))),
        _ => Ok(None),
    }
}

fn fallback(response_result: Option<&Value>) -> NormalizedResult {
    match response_result {
        Some(Value::Object(fields)) => {
            NormalizedResult::found(fields.clone(), NormalizationSource::ResponseResult)
        }
        _ => NormalizedResult::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> ResultMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn double_encoded(inner: &Value) -> String {
        json!({ "response": inner.to_string() }).to_string()
    }

    #[test]
    fn inner_result_wins_over_response_result() {
        let result = AgentCallResult {
            raw_response: Some(double_encoded(&json!({"result": {"a": 1}}))),
            ..AgentCallResult::succeeded(json!({"b": 2}))
        };
        let normalized = normalize(&result);
        assert_eq!(normalized.fields(), &object(json!({"a": 1})));
        assert_eq!(normalized.source(), NormalizationSource::RawResult);
    }

    #[test]
    fn null_inner_result_yields_inner_object() {
        let inner = json!({"result": null, "summary": "s"});
        let result = AgentCallResult::from_raw(true, double_encoded(&inner));
        let normalized = normalize(&result);
        assert_eq!(normalized.fields(), &object(inner));
        assert_eq!(normalized.source(), NormalizationSource::RawInner);
    }

    #[test]
    fn non_object_inner_falls_back_to_response_result() {
        let result = AgentCallResult {
            raw_response: Some(double_encoded(&json!(["not", "a", "map"]))),
            ..AgentCallResult::succeeded(json!({"b": 2}))
        };
        let normalized = normalize(&result);
        assert_eq!(normalized.fields(), &object(json!({"b": 2})));
        assert_eq!(normalized.source(), NormalizationSource::ResponseResult);
    }

    #[test]
    fn object_response_field_is_not_unwrapped() {
        let raw = json!({"response": {"result": {"a": 1}}}).to_string();
        let result = AgentCallResult::from_raw(true, raw);
        assert!(!normalize(&result).resolved());
    }

    #[test]
    fn empty_raw_response_is_skipped() {
        let result = AgentCallResult {
            raw_response: Some(String::new()),
            ..AgentCallResult::succeeded(json!({"b": 2}))
        };
        assert_eq!(normalize(&result).source(), NormalizationSource::ResponseResult);
    }

    #[test]
    fn untyped_envelope_with_odd_shapes_never_fails() {
        for value in [
            json!(null),
            json!("text"),
            json!({"response": 5}),
            json!({"response": {"result": "flat"}}),
            json!({"raw_response": {"response": "{}"}}),
            json!({"raw_response": "null"}),
            json!({"raw_response": "{\"response\":\"[1,2]\"}"}),
        ] {
            let normalized = normalize_value(&value);
            assert!(normalized.is_empty(), "{value}");
            assert!(!normalized.resolved(), "{value}");
        }
    }
}
