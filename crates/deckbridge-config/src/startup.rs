//! Parsing of the startup parameters the host passes to the plugin.
//!
//! The host launches the plugin with exactly four `-key value` pairs, in any
//! order:
//!
//! ```text
//! deckbridged -port 28196 -pluginUUID 0A1B... -registerEvent registerPlugin -info '{...}'
//! ```
//!
//! Any deviation is fatal: the process must exit before a channel is opened.

use std::ffi::OsString;

use thiserror::Error;

const PORT_PARAMETER: &str = "-port";
const PLUGIN_UUID_PARAMETER: &str = "-pluginUUID";
const REGISTER_EVENT_PARAMETER: &str = "-registerEvent";
const INFO_PARAMETER: &str = "-info";

const PARAMETER_PAIRS: usize = 4;
const EXPECTED_ARGUMENTS: usize = PARAMETER_PAIRS * 2;

/// Validated startup parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupParameters {
    port: u16,
    plugin_uuid: String,
    register_event: String,
    info: String,
}

/// Errors raised while parsing startup parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    /// The host passed the wrong number of arguments.
    #[error("invalid number of parameters: {count} instead of 8")]
    ArgumentCount {
        /// Number of arguments received, excluding the program name.
        count: usize,
    },
    /// An argument was not valid UTF-8.
    #[error("parameter at position {position} is not valid UTF-8")]
    InvalidUnicode {
        /// Zero-based position among the arguments.
        position: usize,
    },
    /// A parameter key is not one of the four known keys.
    #[error("unknown parameter '{name}'")]
    UnknownParameter {
        /// Key as received.
        name: String,
    },
    /// The port is zero, negative, or not a number.
    #[error("invalid port number '{value}'")]
    InvalidPort {
        /// Value as received.
        value: String,
    },
    /// A required parameter was absent or empty.
    #[error("invalid {name}: a non-empty value is required")]
    MissingParameter {
        /// Key of the missing parameter.
        name: &'static str,
    },
}

impl StartupParameters {
    /// Parses the process arguments, excluding the program name.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] describing the first problem found. Port
    /// validation precedes the string parameters, which are checked in the
    /// order plugin UUID, registration event, info.
    pub fn parse<I>(arguments: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let arguments = arguments
            .into_iter()
            .enumerate()
            .map(|(position, argument)| {
                argument
                    .into_string()
                    .map_err(|_| StartupError::InvalidUnicode { position })
            })
            .collect::<Result<Vec<String>, StartupError>>()?;

        if arguments.len() != EXPECTED_ARGUMENTS {
            return Err(StartupError::ArgumentCount {
                count: arguments.len(),
            });
        }

        let mut port = None;
        let mut plugin_uuid = String::new();
        let mut register_event = String::new();
        let mut info = String::new();

        for pair in arguments.chunks_exact(2) {
            let [key, value] = pair else {
                continue;
            };
            match key.as_str() {
                PORT_PARAMETER => port = Some(value.clone()),
                PLUGIN_UUID_PARAMETER => plugin_uuid.clone_from(value),
                REGISTER_EVENT_PARAMETER => register_event.clone_from(value),
                INFO_PARAMETER => info.clone_from(value),
                other => {
                    return Err(StartupError::UnknownParameter {
                        name: other.to_owned(),
                    });
                }
            }
        }

        let port = parse_port(port)?;
        let plugin_uuid = require(plugin_uuid, "plugin UUID")?;
        let register_event = require(register_event, "registration event")?;
        let info = require(info, "info")?;

        Ok(Self {
            port,
            plugin_uuid,
            register_event,
            info,
        })
    }

    /// Loopback port the host listens on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Identifier the host assigned to this plugin instance.
    #[must_use]
    pub const fn plugin_uuid(&self) -> &str {
        self.plugin_uuid.as_str()
    }

    /// Event name to send when registering with the host.
    #[must_use]
    pub const fn register_event(&self) -> &str {
        self.register_event.as_str()
    }

    /// Opaque description of the host environment.
    #[must_use]
    pub const fn info(&self) -> &str {
        self.info.as_str()
    }

    /// WebSocket endpoint of the host.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }
}

fn parse_port(value: Option<String>) -> Result<u16, StartupError> {
    let Some(value) = value else {
        return Err(StartupError::MissingParameter { name: "port" });
    };
    match value.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(StartupError::InvalidPort { value }),
    }
}

fn require(value: String, name: &'static str) -> Result<String, StartupError> {
    if value.is_empty() {
        Err(StartupError::MissingParameter { name })
    } else {
        Ok(value)
    }
}
