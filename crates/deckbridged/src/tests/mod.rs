//! Crate-level integration and BDD tests.

use std::sync::{Arc, Mutex};

use deckbridge_actions::{ActionDescriptor, ActionExecutor, ExecutionError, ResponseDocument};
use deckbridge_config::Config;

use crate::bootstrap::{StaticConfigLoader, bootstrap_with};
use crate::channel::{ChannelError, RUNNING_MESSAGE};
use crate::health::HealthReporter;
use crate::test_support::{ScriptedTransport, exclusive_channel, startup_parameters};


/// Executor answering every call with a fixed response.
#[derive(Clone)]
struct StubExecutor {
    response: ResponseDocument,
    descriptors: Arc<Mutex<Vec<ActionDescriptor>>>,
}

impl StubExecutor {
    fn answering(response: ResponseDocument) -> Self {
        Self {
            response,
            descriptors: Arc::default(),
        }
    }

    fn descriptors(&self) -> Vec<ActionDescriptor> {
        self.descriptors.lock().expect("descriptor lock").clone()
    }
}

impl ActionExecutor for StubExecutor {
    fn execute(&self, descriptor: &ActionDescriptor) -> Result<ResponseDocument, ExecutionError> {
        self.descriptors
            .lock()
            .expect("descriptor lock")
            .push(descriptor.clone());
        Ok(self.response.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed,
    ChannelConnecting(String),
    ChannelClosed,
    ChannelFailed,
}

#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingReporter {
    fn push(&self, event: HealthEvent) {
        self.events.lock().expect("events lock").push(event);
    }

    fn events(&self) -> Vec<HealthEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl HealthReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.push(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.push(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, _error: &crate::BootstrapError) {
        self.push(HealthEvent::BootstrapFailed);
    }

    fn channel_connecting(&self, endpoint: &str) {
        self.push(HealthEvent::ChannelConnecting(endpoint.to_owned()));
    }

    fn channel_closed(&self) {
        self.push(HealthEvent::ChannelClosed);
    }

    fn channel_failed(&self, _error: &ChannelError) {
        self.push(HealthEvent::ChannelFailed);
    }
}

#[test]
fn bootstrapped_plugin_serves_until_host_closes() {
    let _guard = exclusive_channel();
    let reporter = Arc::new(RecordingReporter::default());
    let loader = StaticConfigLoader::new(Config::default());
    let plugin =
        bootstrap_with(&loader, reporter.clone(), startup_parameters()).expect("bootstrap");
    assert_eq!(plugin.executor().program(), "mumble_json_bridge_cli");

    let transport = ScriptedTransport::with_messages([
        r#"{"event":"keyDown","action":"info.mumble.streamdeck.togglelocalusermute","context":"c"}"#,
    ]);
    let executor = StubExecutor::answering(ResponseDocument::success());
    plugin
        .run_with(|_| Ok(transport.clone()), executor.clone())
        .expect("run");

    assert_eq!(executor.descriptors().len(), 1);
    assert_eq!(
        reporter.events(),
        vec![
            HealthEvent::BootstrapStarting,
            HealthEvent::BootstrapSucceeded,
            HealthEvent::ChannelConnecting("ws://127.0.0.1:28196".to_owned()),
            HealthEvent::ChannelClosed,
        ]
    );
    assert_eq!(
        transport.sent_json()[1]["payload"]["message"],
        RUNNING_MESSAGE
    );
}

#[test]
fn connect_failure_is_reported_and_returned() {
    let _guard = exclusive_channel();
    let reporter = Arc::new(RecordingReporter::default());
    let loader = StaticConfigLoader::new(Config::default());
    let plugin =
        bootstrap_with(&loader, reporter.clone(), startup_parameters()).expect("bootstrap");

    let result = plugin.run_with(
        |_| Err::<ScriptedTransport, _>(ChannelError::AlreadyOpen),
        StubExecutor::answering(ResponseDocument::success()),
    );

    assert!(result.is_err());
    assert_eq!(reporter.events().last(), Some(&HealthEvent::ChannelFailed));
}
