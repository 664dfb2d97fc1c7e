//! Domain handling of routed host events.
//!
//! [`ActionDispatcher`] is the plugin's [`EventHandler`]. A key press clears
//! the control's title, runs the action through an
//! [`ActionRunner`](deckbridge_actions::ActionRunner), and reports the outcome
//! to the host: a success line in the host log, or an error line plus an alert
//! on the control. Settings sent by the property inspector replace the stored
//! settings and are echoed back so the host persists them.

mod handler;

use tracing::{debug, info, trace, warn};

use deckbridge_actions::{ActionExecutor, ActionRunner, SettingsDocument};

use crate::channel::HostApi;
use crate::codec::{InboundMessage, JsonObject, Target};

pub use self::handler::EventHandler;

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

const SETTINGS_KEY: &str = "settings";

/// Runs actions on key presses and keeps the current settings.
#[derive(Debug)]
pub struct ActionDispatcher<E> {
    runner: ActionRunner<E>,
    settings: SettingsDocument,
}

impl<E: ActionExecutor> ActionDispatcher<E> {
    /// Creates a dispatcher with empty settings.
    #[must_use]
    pub fn new(executor: E) -> Self {
        Self {
            runner: ActionRunner::new(executor),
            settings: SettingsDocument::new(),
        }
    }

    /// Settings the next action will be resolved against.
    #[must_use]
    pub const fn settings(&self) -> &SettingsDocument {
        &self.settings
    }

    fn store_settings(&mut self, settings: JsonObject) {
        debug!(
            target: DISPATCH_TARGET,
            keys = settings.len(),
            "stored settings"
        );
        self.settings = settings;
    }

    /// Asks the host to persist the stored settings for `context`.
    fn echo_settings(&self, host: &mut HostApi<'_>, context: &str) {
        if context.is_empty() {
            trace!(target: DISPATCH_TARGET, "no context to persist settings for");
            return;
        }
        host.set_settings(&self.settings, context);
    }
}

impl<E: ActionExecutor> EventHandler for ActionDispatcher<E> {
    fn key_down(&mut self, host: &mut HostApi<'_>, event: &InboundMessage) {
        let action = event.action.as_str();
        let context = event.context.as_str();
        host.set_title("", context, Target::HardwareAndSoftware);

        match self.runner.run(action, &self.settings) {
            Ok(response) if response.is_error() => {
                let detail = response.error_message().unwrap_or_default();
                warn!(
                    target: DISPATCH_TARGET,
                    action,
                    context,
                    detail,
                    "bridge reported an error"
                );
                host.report_error(
                    &format!("error while executing action {action}: {detail}"),
                    context,
                );
            }
            Ok(_) => {
                info!(target: DISPATCH_TARGET, action, context, "action executed");
                host.log_message(&format!("successfully executed action {action}"));
            }
            Err(error) => {
                warn!(target: DISPATCH_TARGET, action, context, %error, "action failed");
                host.report_error(&error.to_string(), context);
            }
        }
    }

    fn key_up(&mut self, _host: &mut HostApi<'_>, event: &InboundMessage) {
        trace!(target: DISPATCH_TARGET, context = event.context.as_str(), "key up");
    }

    fn will_appear(&mut self, _host: &mut HostApi<'_>, event: &InboundMessage) {
        trace!(target: DISPATCH_TARGET, context = event.context.as_str(), "will appear");
    }

    fn will_disappear(&mut self, _host: &mut HostApi<'_>, event: &InboundMessage) {
        trace!(target: DISPATCH_TARGET, context = event.context.as_str(), "will disappear");
    }

    fn device_did_connect(&mut self, _host: &mut HostApi<'_>, device: &str, _info: &JsonObject) {
        trace!(target: DISPATCH_TARGET, device, "device connected");
    }

    fn device_did_disconnect(&mut self, _host: &mut HostApi<'_>, device: &str) {
        trace!(target: DISPATCH_TARGET, device, "device disconnected");
    }

    fn received_global_settings(
        &mut self,
        host: &mut HostApi<'_>,
        context: &str,
        settings: Option<&JsonObject>,
    ) {
        let Some(settings) = settings else {
            trace!(target: DISPATCH_TARGET, context, "global settings carry no settings");
            return;
        };
        self.store_settings(settings.clone());
        self.echo_settings(host, context);
    }

    fn send_to_plugin(&mut self, host: &mut HostApi<'_>, event: &InboundMessage) {
        let Some(settings) = event
            .payload
            .get(SETTINGS_KEY)
            .and_then(serde_json::Value::as_object)
        else {
            trace!(
                target: DISPATCH_TARGET,
                context = event.context.as_str(),
                "payload carries no settings"
            );
            return;
        };
        self.store_settings(settings.clone());
        self.echo_settings(host, &event.context);
    }
}

#[cfg(test)]
mod tests;
