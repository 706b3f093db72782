use dispute_agents::{
    first_present_string, normalize, normalize_value, AgentCallResult, AgentResponse, FieldPath,
    NormalizationSource,
};
use serde_json::{json, Value};

fn object(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn double_encoded(inner: &Value) -> String {
    let inner = serde_json::to_string(inner).unwrap();
    serde_json::to_string(&json!({ "response": inner })).unwrap()
}

#[test]
fn plain_result_is_returned_unchanged() {
    let result = AgentCallResult::succeeded(json!({"summary": "ok", "score": 3}));
    let normalized = normalize(&result);
    assert_eq!(normalized.fields(), &object(json!({"summary": "ok", "score": 3})));
    assert_eq!(normalized.source(), NormalizationSource::ResponseResult);
}

#[test]
fn double_encoded_result_wins_over_response() {
    let raw = double_encoded(&json!({"result": {"risk_level": "high"}}));
    let result = AgentCallResult {
        raw_response: Some(raw),
        ..AgentCallResult::succeeded(json!({"text": "ignored"}))
    };
    let normalized = normalize(&result);
    assert_eq!(normalized.fields(), &object(json!({"risk_level": "high"})));
    assert_eq!(normalized.source(), NormalizationSource::RawResult);
}

#[test]
fn inner_object_without_result_is_used_whole() {
    let raw = double_encoded(&json!({"summary": "inner", "status": "done"}));
    let normalized = normalize(&AgentCallResult::from_raw(true, raw));
    assert_eq!(
        normalized.fields(),
        &object(json!({"summary": "inner", "status": "done"}))
    );
    assert_eq!(normalized.source(), NormalizationSource::RawInner);
}

#[test]
fn unparseable_raw_falls_back_to_response_result() {
    let result = AgentCallResult {
        raw_response: Some("{not json".to_string()),
        ..AgentCallResult::succeeded(json!({"summary": "fallback"}))
    };
    assert_eq!(
        normalize(&result).fields(),
        &object(json!({"summary": "fallback"}))
    );

    let nested_broken = serde_json::to_string(&json!({"response": "{broken"})).unwrap();
    let result = AgentCallResult {
        raw_response: Some(nested_broken),
        ..AgentCallResult::succeeded(json!({"summary": "fallback"}))
    };
    assert_eq!(
        normalize(&result).get("summary"),
        Some(&json!("fallback"))
    );
}

#[test]
fn missing_everything_yields_empty_mapping() {
    let cases = [
        AgentCallResult::default(),
        AgentCallResult {
            success: true,
            response: Some(AgentResponse {
                status: "success".to_string(),
                result: None,
            }),
            raw_response: None,
        },
        AgentCallResult::from_raw(true, ""),
        AgentCallResult::succeeded(json!(["not", "an", "object"])),
    ];
    for result in cases {
        let normalized = normalize(&result);
        assert!(normalized.is_empty(), "{result:?}");
        assert!(!normalized.resolved());
        assert_eq!(normalized.source(), NormalizationSource::Empty);
    }
}

#[test]
fn arbitrary_json_values_never_panic() {
    let inputs = [
        json!(null),
        json!(42),
        json!("text"),
        json!({"response": 7}),
        json!({"response": {"result": "string result"}}),
        json!({"raw_response": {"not": "a string"}}),
        json!({"raw_response": "\"just a string\""}),
        json!({"raw_response": "{\"response\":12}"}),
        json!({"raw_response": "{\"response\":\"[1,2]\"}"}),
    ];
    for input in inputs {
        let normalized = normalize_value(&input);
        assert!(normalized.is_empty(), "{input}");
    }
}

#[test]
fn scenario_plain_success() {
    let value = json!({
        "success": true,
        "response": {"status": "success", "result": {"summary": "ok"}}
    });
    assert_eq!(normalize_value(&value).fields(), &object(json!({"summary": "ok"})));
}

#[test]
fn scenario_double_encoded_case_summary() {
    let value = json!({
        "success": true,
        "raw_response": "{\"response\":\"{\\\"result\\\":{\\\"case_summary\\\":{\\\"dispute_reason\\\":\\\"unrecognized\\\"}}}\"}"
    });
    assert_eq!(
        normalize_value(&value).fields(),
        &object(json!({"case_summary": {"dispute_reason": "unrecognized"}}))
    );
}

#[test]
fn scenario_failed_call_with_garbage() {
    let value = json!({"success": false, "raw_response": "not json"});
    assert!(normalize_value(&value).is_empty());
}

#[test]
fn first_present_string_walks_paths_in_order() {
    let fields = object(json!({"case_summary": {"dispute_reason": "x"}}));
    let paths: Vec<FieldPath> = [
        "case_summary.merchant_analysis",
        "case_summary.dispute_reason",
        "summary",
    ]
    .into_iter()
    .map(FieldPath::new)
    .collect();
    assert_eq!(first_present_string(&fields, &paths, "default"), "x");
    assert_eq!(first_present_string(&fields, &paths[..1], "default"), "default");
}
