//! Plugin bootstrap orchestration.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use deckbridge_actions::{ActionExecutor, CliExecutor};
use deckbridge_config::{Config, StartupParameters};

use crate::channel::{ChannelError, ChannelSession, Transport, WebSocketTransport};
use crate::dispatch::ActionDispatcher;
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Abstracts configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a configuration layer is malformed.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that reads the environment and configuration files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_without_arguments()
    }
}

/// Loader that hands out a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps a prepared configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// A bootstrapped plugin, ready to connect.
pub struct Plugin {
    config: Config,
    parameters: StartupParameters,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Plugin {
    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Startup parameters supplied by the host.
    #[must_use]
    pub const fn parameters(&self) -> &StartupParameters {
        &self.parameters
    }

    /// Telemetry handle, mainly useful in tests.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Executor for the configured bridge CLI.
    #[must_use]
    pub fn executor(&self) -> CliExecutor {
        CliExecutor::new(self.config.bridge_cli()).with_timeout(self.config.action_timeout())
    }

    /// Connects to the host over WebSocket and serves events until the host
    /// closes the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] if the connection cannot be established or
    /// fails while open.
    pub fn run(&self) -> Result<(), ChannelError> {
        self.run_with(WebSocketTransport::connect, self.executor())
    }

    /// Serves events over a caller-supplied transport and executor.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] if `connector` fails or the transport fails
    /// while open.
    pub fn run_with<T, F, E>(&self, connector: F, executor: E) -> Result<(), ChannelError>
    where
        T: Transport,
        F: FnOnce(&str) -> Result<T, ChannelError>,
        E: ActionExecutor,
    {
        self.reporter.channel_connecting(&self.parameters.endpoint());
        let result = ChannelSession::connect(&self.parameters, connector).and_then(|mut session| {
            let mut dispatcher = ActionDispatcher::new(executor);
            session.run(&mut dispatcher)
        });
        match &result {
            Ok(()) => self.reporter.channel_closed(),
            Err(error) => self.reporter.channel_failed(error),
        }
        result
    }
}

/// Bootstraps the plugin using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] if configuration or telemetry fails; the
/// reporter has been notified before this returns.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    parameters: StartupParameters,
) -> Result<Plugin, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Plugin {
        config,
        parameters,
        telemetry,
        reporter,
    })
}
