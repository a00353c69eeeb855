//! Unit tests for response envelope validation

use backupchan_client::api::envelope::check_success;
use backupchan_client::ApiError;
use rstest::rstest;
use serde_json::{json, Value};
use test_utils::Response;

#[rstest]
#[case(json!(true))]
#[case(json!(1))]
#[case(json!(2.5))]
#[case(json!("yes"))]
#[case(json!([0]))]
#[case(json!({"a": 1}))]
fn test_truthy_marker_succeeds(#[case] marker: Value) {
    let payload = json!({ "success": marker, "value": 7 });
    let map = check_success(Response::new(payload, 200)).unwrap();
    assert_eq!(map["value"], 7);
}

#[rstest]
#[case(json!(false))]
#[case(json!(0))]
#[case(json!(0.0))]
#[case(json!(""))]
#[case(json!([]))]
#[case(json!({}))]
#[case(Value::Null)]
fn test_falsy_marker_fails(#[case] marker: Value) {
    let payload = json!({ "success": marker, "message": "nope" });
    match check_success(Response::new(payload.clone(), 400)) {
        Err(ApiError::OperationFailed { status, payload: returned }) => {
            assert_eq!(status, 400);
            assert_eq!(returned, payload);
        }
        other => panic!("Expected OperationFailed, got {:?}", other),
    }
}

#[test]
fn test_missing_marker_fails() {
    let err = check_success(Response::new(json!({ "id": "abc" }), 200)).unwrap_err();
    assert_eq!(err.status(), Some(200));
}

#[test]
fn test_non_object_payload_fails() {
    let err = check_success(Response::new(Value::Null, 502)).unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.payload(), Some(&Value::Null));
}

#[test]
fn test_status_is_not_consulted_on_success() {
    // A 500 with a truthy marker is still a success
    let map = check_success(Response::new(json!({ "success": true }), 500)).unwrap();
    assert_eq!(map.len(), 1);
}

#[test]
fn test_error_message_includes_payload_and_code() {
    let err = check_success(Response::new(json!({ "success": false }), 404)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("404"));
    assert!(message.contains("\"success\":false"));
}
