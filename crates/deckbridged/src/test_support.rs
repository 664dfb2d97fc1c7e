//! Shared doubles for session and dispatcher tests.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use deckbridge_config::StartupParameters;

use crate::channel::{ChannelError, Transport};

pub(crate) const PLUGIN_UUID: &str = "0A1B2C3D";
pub(crate) const REGISTER_EVENT: &str = "registerPlugin";

static CHANNEL_LOCK: Mutex<()> = Mutex::new(());

/// Serialises tests that open a session, since only one may exist at a time.
pub(crate) fn exclusive_channel() -> MutexGuard<'static, ()> {
    CHANNEL_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn startup_parameters() -> StartupParameters {
    StartupParameters::parse(
        [
            "-port",
            "28196",
            "-pluginUUID",
            PLUGIN_UUID,
            "-registerEvent",
            REGISTER_EVENT,
            "-info",
            "{}",
        ]
        .map(OsString::from),
    )
    .expect("valid startup parameters")
}

enum Scripted {
    Text(String),
    Fail,
}

/// Transport that replays scripted inbound messages and records sends.
///
/// Once the script is exhausted the transport reports the channel as closed.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    inbound: Arc<Mutex<VecDeque<Scripted>>>,
    sent: Arc<Mutex<Vec<String>>>,
    fail_sends: Arc<AtomicBool>,
}

impl ScriptedTransport {
    pub(crate) fn with_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transport = Self::default();
        transport.push_messages(messages);
        transport
    }

    pub(crate) fn push_messages<I, S>(&self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inbound = self.inbound.lock().expect("inbound lock");
        inbound.extend(messages.into_iter().map(|text| Scripted::Text(text.into())));
    }

    pub(crate) fn push_failure(&self) {
        self.inbound
            .lock()
            .expect("inbound lock")
            .push_back(Scripted::Fail);
    }

    pub(crate) fn fail_sends(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub(crate) fn sent_json(&self) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str(text).expect("sent messages are JSON"))
            .collect()
    }

    pub(crate) fn sent_events(&self) -> Vec<String> {
        self.sent_json()
            .iter()
            .map(|message| message["event"].as_str().unwrap_or_default().to_owned())
            .collect()
    }

    pub(crate) fn clear_sent(&self) {
        self.sent.lock().expect("sent lock").clear();
    }
}

fn broken_pipe() -> ChannelError {
    ChannelError::Transport {
        source: Box::new(tungstenite::Error::Io(std::io::Error::from(
            std::io::ErrorKind::BrokenPipe,
        ))),
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(broken_pipe());
        }
        self.sent.lock().expect("sent lock").push(text.to_owned());
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<String>, ChannelError> {
        match self.inbound.lock().expect("inbound lock").pop_front() {
            Some(Scripted::Text(text)) => Ok(Some(text)),
            Some(Scripted::Fail) => Err(broken_pipe()),
            None => Ok(None),
        }
    }
}
