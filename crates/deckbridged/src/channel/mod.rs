//! The plugin's single connection to the host.
//!
//! A [`ChannelSession`] moves through [`ChannelState`] once:
//! `Disconnected → Connecting → Open → Closed`. Connecting sends the
//! registration message and one static log line. While open, each text
//! message is decoded and routed to an [`EventHandler`]; a message that fails
//! to decode, or a handler that panics, is reported to the host and
//! processing continues. The session ends when the host closes the
//! connection or the transport fails.
//!
//! Only one session may exist per process. The claim is taken before
//! connecting and released when the session is dropped.

mod errors;
mod host;
mod transport;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use strum::Display;
use tracing::{debug, error, info, trace, warn};

use deckbridge_config::StartupParameters;

use crate::codec::{self, CodecError, EventKind, Registration};
use crate::dispatch::EventHandler;

pub use self::errors::ChannelError;
pub use self::host::HostApi;
pub use self::transport::{Transport, WebSocketTransport};

const CHANNEL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::channel");

/// Logged to the host once the channel opens.
///
/// The host drops the first log entry it receives, so this line absorbs that
/// loss instead of a meaningful one.
pub const RUNNING_MESSAGE: &str = "deckbridge is running";

/// Reported to the host when an inbound message cannot be processed.
pub const PROCESSING_ERROR_MESSAGE: &str =
    "connection manager encountered an unexpected error during event processing";

static CHANNEL_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChannelState {
    /// No connection attempted yet.
    Disconnected,
    /// Dialling the host.
    Connecting,
    /// Registered and routing events.
    Open,
    /// Terminal: closed by the host or failed.
    Closed,
}

/// Process-wide exclusive claim on the host channel.
#[derive(Debug)]
struct ChannelClaim;

impl ChannelClaim {
    fn acquire() -> Result<Self, ChannelError> {
        CHANNEL_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self)
            .map_err(|_| ChannelError::AlreadyOpen)
    }
}

impl Drop for ChannelClaim {
    fn drop(&mut self) {
        CHANNEL_CLAIMED.store(false, Ordering::Release);
    }
}

/// An open connection to the host and its routing loop.
#[derive(Debug)]
pub struct ChannelSession<T> {
    transport: T,
    plugin_uuid: String,
    state: ChannelState,
    _claim: ChannelClaim,
}

impl<T: Transport> ChannelSession<T> {
    /// Claims the channel, connects through `connector`, and registers.
    ///
    /// `connector` receives the host endpoint derived from `parameters`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::AlreadyOpen`] when another session is alive,
    /// or whatever `connector` or the registration send fails with.
    pub fn connect<F>(parameters: &StartupParameters, connector: F) -> Result<Self, ChannelError>
    where
        F: FnOnce(&str) -> Result<T, ChannelError>,
    {
        let claim = ChannelClaim::acquire()?;
        let endpoint = parameters.endpoint();
        debug!(
            target: CHANNEL_TARGET,
            endpoint = endpoint.as_str(),
            from = %ChannelState::Disconnected,
            to = %ChannelState::Connecting,
            "channel state changed"
        );

        let transport = connector(&endpoint).inspect_err(|error| {
            warn!(
                target: CHANNEL_TARGET,
                endpoint = endpoint.as_str(),
                %error,
                to = %ChannelState::Closed,
                "channel connection failed"
            );
        })?;

        let mut session = Self {
            transport,
            plugin_uuid: parameters.plugin_uuid().to_owned(),
            state: ChannelState::Connecting,
            _claim: claim,
        };
        session.register(parameters.register_event())?;
        session.transition(ChannelState::Open);
        session.host().log_message(RUNNING_MESSAGE);
        info!(target: CHANNEL_TARGET, endpoint = endpoint.as_str(), "channel open");
        Ok(session)
    }

    fn register(&mut self, register_event: &str) -> Result<(), ChannelError> {
        let registration = Registration {
            event: register_event.to_owned(),
            uuid: self.plugin_uuid.clone(),
        };
        let text = codec::encode(&registration).map_err(|source| ChannelError::Serialize {
            event: registration.event.clone(),
            source,
        })?;
        self.transport.send(&text).inspect_err(|_| {
            self.state = ChannelState::Closed;
        })
    }

    fn transition(&mut self, next: ChannelState) {
        debug!(
            target: CHANNEL_TARGET,
            from = %self.state,
            to = %next,
            "channel state changed"
        );
        self.state = next;
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    /// Outbound operations over this session.
    pub fn host(&mut self) -> HostApi<'_> {
        HostApi::new(&mut self.transport, &self.plugin_uuid)
    }

    /// Routes messages to `handler` until the host closes the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Transport`] if the connection fails. The
    /// session is closed either way.
    pub fn run<H: EventHandler>(&mut self, handler: &mut H) -> Result<(), ChannelError> {
        while self.state == ChannelState::Open {
            match self.transport.receive() {
                Ok(Some(text)) => self.process(&text, handler),
                Ok(None) => {
                    self.transition(ChannelState::Closed);
                    info!(target: CHANNEL_TARGET, "host closed the channel");
                }
                Err(error) => {
                    self.transition(ChannelState::Closed);
                    error!(target: CHANNEL_TARGET, %error, "channel transport failed");
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    /// Decodes and routes one inbound message, reporting any failure.
    pub fn process<H: EventHandler>(&mut self, text: &str, handler: &mut H) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.route(text, handler)));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                warn!(target: CHANNEL_TARGET, %error, "discarding undecodable message");
                self.host().report_error(PROCESSING_ERROR_MESSAGE, "");
            }
            Err(_) => {
                error!(target: CHANNEL_TARGET, "event handler panicked");
                self.host().report_error(PROCESSING_ERROR_MESSAGE, "");
            }
        }
    }

    fn route<H: EventHandler>(&mut self, text: &str, handler: &mut H) -> Result<(), CodecError> {
        let message = codec::decode(text)?;
        let Some(kind) = message.kind() else {
            trace!(target: CHANNEL_TARGET, event = message.event.as_str(), "ignoring event");
            return Ok(());
        };
        debug!(
            target: CHANNEL_TARGET,
            event = %kind,
            context = message.context.as_str(),
            action = message.action.as_str(),
            "routing event"
        );

        let mut host = self.host();
        match kind {
            EventKind::KeyDown => handler.key_down(&mut host, &message),
            EventKind::KeyUp => handler.key_up(&mut host, &message),
            EventKind::WillAppear => handler.will_appear(&mut host, &message),
            EventKind::WillDisappear => handler.will_disappear(&mut host, &message),
            EventKind::DeviceDidConnect => {
                handler.device_did_connect(&mut host, &message.device, &message.device_info);
            }
            EventKind::DeviceDidDisconnect => {
                handler.device_did_disconnect(&mut host, &message.device);
            }
            EventKind::DidReceiveGlobalSettings => {
                let settings = message
                    .payload
                    .get("settings")
                    .and_then(serde_json::Value::as_object);
                handler.received_global_settings(&mut host, &message.context, settings);
            }
            EventKind::SendToPlugin => handler.send_to_plugin(&mut host, &message),
        }
        Ok(())
    }
}
