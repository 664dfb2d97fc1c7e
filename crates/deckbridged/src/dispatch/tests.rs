//! Tests for the action dispatcher, with the executor mocked out.

use std::time::Duration;

use mockall::mock;
use rstest::rstest;
use serde_json::{Value, json};

use deckbridge_actions::{ActionDescriptor, ExecutionError, ResponseDocument};

use super::*;
use crate::test_support::{PLUGIN_UUID, ScriptedTransport};

mock! {
    Executor {}
    impl ActionExecutor for Executor {
        fn execute(
            &self,
            descriptor: &ActionDescriptor,
        ) -> Result<ResponseDocument, ExecutionError>;
    }
}

const MUTE: &str = "info.mumble.streamdeck.togglelocalusermute";
const JOIN: &str = "info.mumble.streamdeck.joinchannel";

/// Builds an executor expecting exactly one call that returns `result`.
fn executor_returning(result: Result<ResponseDocument, ExecutionError>) -> MockExecutor {
    let mut executor = MockExecutor::new();
    executor
        .expect_execute()
        .once()
        .return_once(move |_descriptor| result);
    executor
}

fn executor_unused() -> MockExecutor {
    let mut executor = MockExecutor::new();
    executor.expect_execute().never();
    executor
}

fn key_down(action: &str, context: &str) -> InboundMessage {
    InboundMessage {
        event: "keyDown".to_owned(),
        action: action.to_owned(),
        context: context.to_owned(),
        ..InboundMessage::default()
    }
}

fn send_to_plugin(context: &str, payload: Value) -> InboundMessage {
    let Value::Object(payload) = payload else {
        panic!("payload must be an object");
    };
    InboundMessage {
        event: "sendToPlugin".to_owned(),
        context: context.to_owned(),
        payload,
        ..InboundMessage::default()
    }
}

/// Runs `f` against a host handle and returns what it sent.
fn with_host(f: impl FnOnce(&mut HostApi<'_>)) -> Vec<Value> {
    let recorder = ScriptedTransport::default();
    let mut transport = recorder.clone();
    let mut host = HostApi::new(&mut transport, PLUGIN_UUID);
    f(&mut host);
    recorder.sent_json()
}

fn clear_title(context: &str) -> Value {
    json!({"event": "setTitle", "context": context, "payload": {"target": 0, "title": ""}})
}

fn log_line(message: &str) -> Value {
    json!({"event": "logMessage", "payload": {"message": message}})
}

#[test]
fn successful_action_logs_once_without_alert() {
    let mut dispatcher = ActionDispatcher::new(executor_returning(Ok(ResponseDocument::success())));

    let sent = with_host(|host| dispatcher.key_down(host, &key_down(MUTE, "ctx")));

    assert_eq!(
        sent,
        vec![
            clear_title("ctx"),
            log_line(&format!("successfully executed action {MUTE}")),
        ]
    );
}

#[test]
fn error_response_is_reported_with_alert() {
    let response = ResponseDocument::error("Not connected to a server");
    let mut dispatcher = ActionDispatcher::new(executor_returning(Ok(response)));

    let sent = with_host(|host| dispatcher.key_down(host, &key_down(MUTE, "ctx")));

    assert_eq!(
        sent,
        vec![
            clear_title("ctx"),
            log_line(&format!(
                "plugin error: error while executing action {MUTE}: Not connected to a server"
            )),
            json!({"event": "showAlert", "context": "ctx"}),
        ]
    );
}

#[rstest]
#[case::non_zero(
    ExecutionError::NonZeroExit { status: 2, stderr: String::new() },
    "plugin error: bridge CLI returned non-zero exit code 2"
)]
#[case::timeout(
    ExecutionError::Timeout { timeout: Duration::from_secs(30) },
    "plugin error: bridge CLI did not finish within 30s"
)]
fn execution_failure_is_reported_with_alert(#[case] error: ExecutionError, #[case] line: &str) {
    let mut dispatcher = ActionDispatcher::new(executor_returning(Err(error)));

    let sent = with_host(|host| dispatcher.key_down(host, &key_down(MUTE, "ctx")));

    assert_eq!(
        sent,
        vec![
            clear_title("ctx"),
            log_line(line),
            json!({"event": "showAlert", "context": "ctx"}),
        ]
    );
}

#[rstest]
#[case::unknown("com.example.bogus", "plugin error: unknown action com.example.bogus")]
#[case::join_without_settings(JOIN, "plugin error: channel name not contained in settings")]
fn resolution_failure_never_reaches_the_executor(#[case] action: &str, #[case] line: &str) {
    let mut dispatcher = ActionDispatcher::new(executor_unused());

    let sent = with_host(|host| dispatcher.key_down(host, &key_down(action, "ctx")));

    assert_eq!(
        sent,
        vec![
            clear_title("ctx"),
            log_line(line),
            json!({"event": "showAlert", "context": "ctx"}),
        ]
    );
}

#[test]
fn settings_from_property_inspector_are_stored_and_echoed() {
    let mut dispatcher = ActionDispatcher::new(executor_unused());
    let payload = json!({"settings": {"channel_name": "General", "password": ""}});

    let sent = with_host(|host| dispatcher.send_to_plugin(host, &send_to_plugin("ctx", payload)));

    assert_eq!(
        sent,
        vec![json!({
            "event": "setSettings",
            "context": "ctx",
            "payload": {"channel_name": "General", "password": ""}
        })]
    );
    assert_eq!(dispatcher.settings()["channel_name"], "General");
}

#[test]
fn stored_settings_feed_the_next_action() {
    let mut executor = MockExecutor::new();
    executor
        .expect_execute()
        .withf(|descriptor| {
            descriptor.operation() == "move_local_user"
                && descriptor.parameter("channel") == Some("General")
                && descriptor.parameter("password") == Some("")
        })
        .once()
        .returning(|_| Ok(ResponseDocument::success()));
    let mut dispatcher = ActionDispatcher::new(executor);
    let payload = json!({"settings": {"channel_name": "General", "password": ""}});

    let sent = with_host(|host| {
        dispatcher.send_to_plugin(host, &send_to_plugin("ctx", payload));
        dispatcher.key_down(host, &key_down(JOIN, "ctx"));
    });

    assert_eq!(
        sent.last(),
        Some(&log_line(&format!("successfully executed action {JOIN}")))
    );
}

#[rstest]
#[case::no_settings(json!({"other": 1}))]
#[case::non_object_settings(json!({"settings": "nope"}))]
fn payload_without_settings_changes_nothing(#[case] payload: Value) {
    let mut dispatcher = ActionDispatcher::new(executor_unused());

    let sent = with_host(|host| dispatcher.send_to_plugin(host, &send_to_plugin("ctx", payload)));

    assert!(sent.is_empty());
    assert!(dispatcher.settings().is_empty());
}

#[test]
fn global_settings_without_context_are_stored_silently() {
    let mut dispatcher = ActionDispatcher::new(executor_unused());
    let mut settings = JsonObject::new();
    settings.insert("channel_name".to_owned(), json!("AFK"));

    let sent = with_host(|host| dispatcher.received_global_settings(host, "", Some(&settings)));

    assert!(sent.is_empty());
    assert_eq!(dispatcher.settings(), &settings);
}

#[test]
fn received_settings_with_context_are_echoed_verbatim() {
    let mut dispatcher = ActionDispatcher::new(executor_unused());
    let mut settings = JsonObject::new();
    settings.insert("channel_name".to_owned(), json!("AFK"));
    settings.insert("nested".to_owned(), json!({"keep": [1, 2]}));

    let sent = with_host(|host| dispatcher.received_global_settings(host, "ctx", Some(&settings)));

    assert_eq!(
        sent,
        vec![json!({"event": "setSettings", "context": "ctx", "payload": Value::Object(settings.clone())})]
    );
    assert_eq!(dispatcher.settings(), &settings);
}

#[test]
fn settings_survive_global_event_without_settings() {
    let mut executor = MockExecutor::new();
    executor
        .expect_execute()
        .withf(|descriptor| descriptor.parameter("channel") == Some("General"))
        .once()
        .returning(|_| Ok(ResponseDocument::success()));
    let mut dispatcher = ActionDispatcher::new(executor);
    let payload = json!({"settings": {"channel_name": "General", "password": ""}});

    let sent = with_host(|host| {
        dispatcher.send_to_plugin(host, &send_to_plugin("ctx", payload));
        dispatcher.received_global_settings(host, "ctx", None);
        dispatcher.key_down(host, &key_down(JOIN, "ctx"));
    });

    assert_eq!(dispatcher.settings()["channel_name"], "General");
    assert_eq!(
        sent.last(),
        Some(&log_line(&format!("successfully executed action {JOIN}")))
    );
}

#[test]
fn lifecycle_events_send_nothing() {
    let mut dispatcher = ActionDispatcher::new(executor_unused());
    let event = key_down(MUTE, "ctx");

    let sent = with_host(|host| {
        dispatcher.key_up(host, &event);
        dispatcher.will_appear(host, &event);
        dispatcher.will_disappear(host, &event);
        dispatcher.device_did_connect(host, "dev", &JsonObject::new());
        dispatcher.device_did_disconnect(host, "dev");
    });

    assert!(sent.is_empty());
}
