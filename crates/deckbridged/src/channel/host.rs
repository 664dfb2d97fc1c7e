//! Outbound operations towards the host.

use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::{
    self, ImagePayload, JsonObject, MessagePayload, OutboundMessage, ProfilePayload, StatePayload,
    Target, TitlePayload,
};

use super::errors::ChannelError;
use super::transport::Transport;

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Handle through which handlers talk to the host.
///
/// Every operation is fire-and-forget: a failed send is logged and dropped so
/// that one broken reply never aborts event processing. A transport that has
/// really failed surfaces on the next receive instead.
pub struct HostApi<'a> {
    transport: &'a mut dyn Transport,
    plugin_uuid: &'a str,
}

impl<'a> HostApi<'a> {
    pub(crate) const fn new(transport: &'a mut dyn Transport, plugin_uuid: &'a str) -> Self {
        Self {
            transport,
            plugin_uuid,
        }
    }

    fn send(&mut self, message: &OutboundMessage) {
        if let Err(error) = self.try_send(message) {
            warn!(
                target: HOST_TARGET,
                event = message.event(),
                %error,
                "failed to send message to host"
            );
        }
    }

    fn try_send(&mut self, message: &OutboundMessage) -> Result<(), ChannelError> {
        let text = codec::encode(message).map_err(|source| ChannelError::Serialize {
            event: message.event().to_owned(),
            source,
        })?;
        debug!(target: HOST_TARGET, event = message.event(), "sending message to host");
        self.transport.send(&text)
    }

    /// Sets the title of a control; an empty title clears it.
    pub fn set_title(&mut self, title: &str, context: &str, target: Target) {
        self.send(&OutboundMessage::SetTitle {
            context: context.to_owned(),
            payload: TitlePayload {
                target,
                title: title.to_owned(),
            },
        });
    }

    /// Sets the image of a control.
    ///
    /// A bare base64 PNG gets the data URL prefix; an empty image clears it.
    pub fn set_image(&mut self, image: &str, context: &str, target: Target) {
        self.send(&OutboundMessage::SetImage {
            context: context.to_owned(),
            payload: ImagePayload::new(image, target),
        });
    }

    /// Flashes the alert indicator on a control.
    pub fn show_alert(&mut self, context: &str) {
        self.send(&OutboundMessage::ShowAlert {
            context: context.to_owned(),
        });
    }

    /// Flashes the success indicator on a control.
    pub fn show_ok(&mut self, context: &str) {
        self.send(&OutboundMessage::ShowOk {
            context: context.to_owned(),
        });
    }

    /// Asks the host to persist the settings of a control.
    pub fn set_settings(&mut self, settings: &JsonObject, context: &str) {
        self.send(&OutboundMessage::SetSettings {
            context: context.to_owned(),
            payload: settings.clone(),
        });
    }

    /// Switches a multi-state control.
    pub fn set_state(&mut self, state: u32, context: &str) {
        self.send(&OutboundMessage::SetState {
            context: context.to_owned(),
            payload: StatePayload { state },
        });
    }

    /// Forwards a document to the property inspector of a control.
    pub fn send_to_property_inspector(&mut self, action: &str, context: &str, payload: &Value) {
        self.send(&OutboundMessage::SendToPropertyInspector {
            context: context.to_owned(),
            action: action.to_owned(),
            payload: payload.clone(),
        });
    }

    /// Switches `device` to `profile`, or back to the previous profile when
    /// `profile` is empty. Does nothing without a device.
    pub fn switch_to_profile(&mut self, device: &str, profile: &str) {
        if device.is_empty() {
            return;
        }
        let payload = (!profile.is_empty()).then(|| ProfilePayload {
            profile: profile.to_owned(),
        });
        self.send(&OutboundMessage::SwitchToProfile {
            context: self.plugin_uuid.to_owned(),
            device: device.to_owned(),
            payload,
        });
    }

    /// Appends a line to the host log. Empty lines are not sent.
    pub fn log_message(&mut self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.send(&OutboundMessage::LogMessage {
            payload: MessagePayload {
                message: message.to_owned(),
            },
        });
    }

    /// Logs `plugin error: <message>` and alerts `context` when one is given.
    pub fn report_error(&mut self, message: &str, context: &str) {
        warn!(target: HOST_TARGET, context, message, "reporting plugin error");
        self.log_message(&format!("plugin error: {message}"));
        if !context.is_empty() {
            self.show_alert(context);
        }
    }
}
