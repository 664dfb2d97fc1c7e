//! Shared configuration for the deckbridge plugin process.
//!
//! Two independent inputs shape a running bridge:
//!
//! * [`Config`] holds operator-tunable settings (log filter and format, the
//!   name of the bridge CLI, the action timeout). It is loaded through
//!   `ortho_config`, which layers defaults, configuration files, and
//!   `DECKBRIDGE_*` environment variables.
//! * [`StartupParameters`] holds the four `-key value` pairs the host passes
//!   on the command line when it launches the plugin. They are parsed by hand
//!   because the host uses single-dash long flags that do not fit a
//!   conventional argument parser.

mod defaults;
mod logging;
mod startup;

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_ACTION_TIMEOUT_SECS, DEFAULT_BRIDGE_CLI, DEFAULT_LOG_FILTER, default_bridge_cli,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use startup::{StartupError, StartupParameters};

/// Program name handed to the configuration loader in place of real
/// process arguments, which belong to the host.
const LOADER_PROGRAM_NAME: &str = "deckbridged";

/// Operator configuration for the bridge process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "DECKBRIDGE")]
pub struct Config {
    /// Tracing filter expression applied to process diagnostics.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for process diagnostics.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Name of the external bridge executable, resolved through `PATH`.
    #[ortho_config(default = defaults::default_bridge_cli())]
    pub bridge_cli: String,
    /// Upper bound on a single action execution; `0` disables the limit.
    #[ortho_config(default = defaults::DEFAULT_ACTION_TIMEOUT_SECS)]
    pub action_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
            bridge_cli: defaults::default_bridge_cli(),
            action_timeout_secs: defaults::DEFAULT_ACTION_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from files and the environment only.
    ///
    /// The process arguments are never consulted: they carry the host's
    /// startup parameters, which [`StartupParameters::parse`] handles.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a configuration layer is malformed.
    pub fn load_without_arguments() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter([OsString::from(LOADER_PROGRAM_NAME)])
    }

    /// Tracing filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Diagnostic output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Name of the bridge executable.
    #[must_use]
    pub const fn bridge_cli(&self) -> &str {
        self.bridge_cli.as_str()
    }

    /// Execution timeout, or `None` when disabled.
    #[must_use]
    pub const fn action_timeout(&self) -> Option<Duration> {
        if self.action_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.action_timeout_secs))
        }
    }
}
