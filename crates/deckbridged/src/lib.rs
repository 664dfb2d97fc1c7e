//! Host-side runtime of the deckbridge plugin.
//!
//! The control-panel host launches `deckbridged` with four startup parameters
//! and expects it to connect back over a loopback WebSocket, register itself,
//! and react to events from then on. This crate provides that runtime:
//!
//! * [`codec`] decodes inbound events and encodes outbound ones.
//! * [`channel`] owns the single connection, routes inbound events to an
//!   [`EventHandler`], and exposes outbound operations through [`HostApi`].
//! * [`dispatch`] holds [`ActionDispatcher`], which turns key presses into
//!   bridge CLI invocations via `deckbridge_actions` and reports the outcome.
//! * [`bootstrap_with`] loads configuration, installs telemetry, and reports
//!   lifecycle events through a [`HealthReporter`].
//!
//! Events are handled one at a time on the receive thread. A slow bridge CLI
//! therefore delays the next event, bounded by the configured action timeout.

mod bootstrap;
pub mod channel;
pub mod codec;
pub mod dispatch;
mod health;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Plugin, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use channel::{ChannelError, ChannelSession, ChannelState, HostApi, Transport};
pub use dispatch::{ActionDispatcher, EventHandler};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
