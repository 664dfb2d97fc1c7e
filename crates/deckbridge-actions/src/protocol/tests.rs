//! Unit tests for the bridge CLI wire types.

use std::collections::BTreeMap;

use serde_json::json;

use super::*;

#[test]
fn command_argument_omits_parameters_when_absent() {
    let descriptor = ActionDescriptor::new("toggle_local_user_mute");
    let argument = descriptor.to_command_argument().expect("serialise");
    let value: serde_json::Value = serde_json::from_str(&argument).expect("valid json");
    assert_eq!(
        value,
        json!({
            "message_type": "operation",
            "message": { "operation": "toggle_local_user_mute" }
        })
    );
}

#[test]
fn command_argument_nests_parameters_under_parameter_key() {
    let descriptor = ActionDescriptor::with_parameters(
        "move_local_user",
        BTreeMap::from([
            ("channel".to_owned(), "General".to_owned()),
            ("password".to_owned(), String::new()),
        ]),
    );
    let argument = descriptor.to_command_argument().expect("serialise");
    let value: serde_json::Value = serde_json::from_str(&argument).expect("valid json");
    assert_eq!(
        value.pointer("/message/parameter"),
        Some(&json!({ "channel": "General", "password": "" }))
    );
}

#[test]
fn response_without_body_parses() {
    let response: ResponseDocument =
        serde_json::from_str(r#"{"response_type":"success"}"#).expect("parse");
    assert!(!response.is_error());
    assert_eq!(response.error_message(), None);
}

#[test]
fn error_response_exposes_message() {
    let response: ResponseDocument = serde_json::from_str(
        r#"{"response_type":"error","response":{"error_message":"not connected"}}"#,
    )
    .expect("parse");
    assert!(response.is_error());
    assert_eq!(response.error_message(), Some("not connected"));
}

#[test]
fn unfamiliar_response_type_is_not_an_error() {
    let response: ResponseDocument =
        serde_json::from_str(r#"{"response_type":"pending","response":{}}"#).expect("parse");
    assert!(!response.is_error());
    assert_eq!(response.response_type(), "pending");
}

#[test]
fn response_requires_response_type() {
    let result = serde_json::from_str::<ResponseDocument>(r#"{"response":{}}"#);
    assert!(result.is_err());
}

#[test]
fn error_constructor_matches_cli_shape() {
    let response = ResponseDocument::error("boom");
    let value = serde_json::to_value(&response).expect("serialise");
    assert_eq!(
        value,
        json!({ "response_type": "error", "response": { "error_message": "boom" } })
    );
}
