//! Crate-level test doubles and BDD tests.

use std::sync::Mutex;

use crate::error::ExecutionError;
use crate::protocol::{ActionDescriptor, ResponseDocument, SettingsDocument};
use crate::runner::{ActionExecutor, ActionRunner};


/// Records every descriptor it receives and answers with success.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    descriptors: Mutex<Vec<ActionDescriptor>>,
}

impl RecordingExecutor {
    pub(crate) fn descriptors(&self) -> Vec<ActionDescriptor> {
        self.descriptors
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub(crate) fn operations(&self) -> Vec<String> {
        self.descriptors()
            .into_iter()
            .map(|descriptor| descriptor.operation().to_owned())
            .collect()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&self, descriptor: &ActionDescriptor) -> Result<ResponseDocument, ExecutionError> {
        self.descriptors
            .lock()
            .expect("descriptor log lock")
            .push(descriptor.clone());
        Ok(ResponseDocument::success())
    }
}

/// Fails every execution as though the CLI exited with status 1.
pub(crate) struct FailingExecutor;

impl ActionExecutor for FailingExecutor {
    fn execute(&self, _descriptor: &ActionDescriptor) -> Result<ResponseDocument, ExecutionError> {
        Err(ExecutionError::NonZeroExit {
            status: 1,
            stderr: "Mumble is not running".to_owned(),
        })
    }
}

/// Answers every execution with an error response document.
pub(crate) struct RejectingExecutor {
    pub(crate) message: String,
}

impl ActionExecutor for RejectingExecutor {
    fn execute(&self, _descriptor: &ActionDescriptor) -> Result<ResponseDocument, ExecutionError> {
        Ok(ResponseDocument::error(self.message.clone()))
    }
}

#[test]
fn end_to_end_runner_with_recording_executor() {
    let executor = RecordingExecutor::default();
    let runner = ActionRunner::new(&executor);
    let mut settings = SettingsDocument::new();
    settings.insert("channel_name".into(), "Lobby".into());
    settings.insert("password".into(), "secret".into());

    let response = runner
        .run("info.mumble.streamdeck.joinchannel", &settings)
        .expect("join channel");
    assert!(!response.is_error());

    let recorded = executor.descriptors();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].operation(), "move_local_user");
    assert_eq!(recorded[0].parameter("channel"), Some("Lobby"));
    assert_eq!(recorded[0].parameter("password"), Some("secret"));
}
