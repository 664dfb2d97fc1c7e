//! Structured health reporting for plugin lifecycle events.

use std::sync::Arc;

use deckbridge_config::Config;

use crate::bootstrap::BootstrapError;
use crate::channel::ChannelError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer for lifecycle events.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before dialling the host.
    fn channel_connecting(&self, endpoint: &str);

    /// Invoked when the session ends because the host closed it.
    fn channel_closed(&self);

    /// Invoked when the session fails.
    fn channel_failed(&self, error: &ChannelError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn channel_connecting(&self, endpoint: &str) {
        (**self).channel_connecting(endpoint);
    }

    fn channel_closed(&self) {
        (**self).channel_closed();
    }

    fn channel_failed(&self, error: &ChannelError) {
        (**self).channel_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting plugin bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            bridge_cli = config.bridge_cli(),
            action_timeout = ?config.action_timeout(),
            log_filter = config.log_filter(),
            log_format = %config.log_format(),
            "plugin bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "plugin bootstrap failed"
        );
    }

    fn channel_connecting(&self, endpoint: &str) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "channel_connecting",
            endpoint,
            "connecting to host"
        );
    }

    fn channel_closed(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "channel_closed",
            "host channel closed"
        );
    }

    fn channel_failed(&self, error: &ChannelError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "channel_failed",
            error = %error,
            "host channel failed"
        );
    }
}
