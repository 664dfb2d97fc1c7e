//! Callbacks the channel session routes inbound events to.

use crate::channel::HostApi;
use crate::codec::{InboundMessage, JsonObject};

/// Receives routed host events.
///
/// Every method defaults to doing nothing so implementations only override the
/// events they care about. Handlers run on the receive thread and may reply
/// through `host` before returning.
pub trait EventHandler {
    /// A key was pressed.
    fn key_down(&mut self, host: &mut HostApi<'_>, event: &InboundMessage) {
        let _ = (host, event);
    }

    /// A key was released.
    fn key_up(&mut self, host: &mut HostApi<'_>, event: &InboundMessage) {
        let _ = (host, event);
    }

    /// An action instance became visible.
    fn will_appear(&mut self, host: &mut HostApi<'_>, event: &InboundMessage) {
        let _ = (host, event);
    }

    /// An action instance was hidden.
    fn will_disappear(&mut self, host: &mut HostApi<'_>, event: &InboundMessage) {
        let _ = (host, event);
    }

    /// A device was attached.
    fn device_did_connect(&mut self, host: &mut HostApi<'_>, device: &str, info: &JsonObject) {
        let _ = (host, device, info);
    }

    /// A device was detached.
    fn device_did_disconnect(&mut self, host: &mut HostApi<'_>, device: &str) {
        let _ = (host, device);
    }

    /// The host delivered settings; `context` is empty for global settings.
    ///
    /// `settings` is `None` when the payload carries no `settings` object.
    fn received_global_settings(
        &mut self,
        host: &mut HostApi<'_>,
        context: &str,
        settings: Option<&JsonObject>,
    ) {
        let _ = (host, context, settings);
    }

    /// The property inspector sent a payload for the control in `event`.
    fn send_to_plugin(&mut self, host: &mut HostApi<'_>, event: &InboundMessage) {
        let _ = (host, event);
    }
}
