//! Domain errors raised while resolving and executing actions.
//!
//! Both enums carry structured context so the dispatcher can log them with
//! fields and still render a single human-readable line for the host. I/O
//! errors are wrapped in `Arc` to keep the variants small and cloneable.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::resolver::SettingField;

/// Failure to map an action identifier and settings to a descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// The identifier is not in the action table.
    #[error("unknown action {action}")]
    UnknownAction {
        /// Identifier as received from the host.
        action: String,
    },

    /// A setting the action requires is absent from the settings document.
    #[error("{field} not contained in settings")]
    MissingSetting {
        /// The absent setting.
        field: SettingField,
    },

    /// A setting is present but holds a non-string value.
    #[error("{field} is not specified as a string")]
    InvalidSettingType {
        /// The mistyped setting.
        field: SettingField,
    },
}

/// Failure to run a descriptor through the external bridge CLI.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The executable could not be found on the search path.
    #[error("unable to locate \"{program}\" binary; is it on PATH?")]
    ExecutableNotFound {
        /// Executable name that was looked up.
        program: String,
        /// Lookup failure reported by `which`.
        #[source]
        source: which::Error,
    },

    /// The process could not be launched.
    #[error("failed to launch \"{program}\": {source}")]
    SpawnFailed {
        /// Executable name.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Reading the process output or waiting for it failed.
    #[error("I/O error communicating with \"{program}\": {source}")]
    Io {
        /// Executable name.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The process exited with a non-zero status.
    #[error("bridge CLI returned non-zero exit code {status}{}", stderr_suffix(.stderr))]
    NonZeroExit {
        /// Exit code, or `-1` when the process was terminated by a signal.
        status: i32,
        /// Trimmed standard error output, possibly empty.
        stderr: String,
    },

    /// The process did not finish within the configured limit and was killed.
    #[error("bridge CLI did not finish within {timeout:?}")]
    Timeout {
        /// Configured limit.
        timeout: Duration,
    },

    /// The descriptor could not be serialised for the command line.
    #[error("failed to serialise action descriptor: {0}")]
    SerializeDescriptor(#[source] serde_json::Error),

    /// Standard output was not a response document.
    #[error("bridge CLI returned malformed JSON: {source} (output: \"{output}\")")]
    MalformedResponse {
        /// Trimmed standard output.
        output: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(" (\"{stderr}\")")
    }
}

/// Either stage of the action pipeline failing.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Resolution rejected the action or its settings.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The external process failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
