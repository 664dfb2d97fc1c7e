//! Wire types exchanged with the external bridge CLI.
//!
//! The plugin invokes the CLI once per action as `<cli> --json <descriptor>`,
//! where the descriptor is wrapped in the bridge's operation envelope:
//!
//! ```json
//! {"message_type":"operation","message":{"operation":"move_local_user","parameter":{"channel":"General","password":""}}}
//! ```
//!
//! The CLI answers with one [`ResponseDocument`] on standard output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Host-owned settings for a control, as received from the property inspector.
pub type SettingsDocument = serde_json::Map<String, serde_json::Value>;

const OPERATION_MESSAGE_TYPE: &str = "operation";

/// `response_type` value signalling a failed operation.
pub const ERROR_RESPONSE_TYPE: &str = "error";

/// `response_type` value signalling a successful operation.
pub const SUCCESS_RESPONSE_TYPE: &str = "success";

/// Normalised operation handed to the bridge CLI.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use deckbridge_actions::ActionDescriptor;
///
/// let descriptor = ActionDescriptor::with_parameters(
///     "move_local_user",
///     BTreeMap::from([("channel".to_owned(), "General".to_owned())]),
/// );
/// assert_eq!(descriptor.operation(), "move_local_user");
/// assert_eq!(descriptor.parameter("channel"), Some("General"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameters: Option<BTreeMap<String, String>>,
}

impl ActionDescriptor {
    /// Creates a descriptor for an operation without parameters.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            parameters: None,
        }
    }

    /// Creates a descriptor carrying parameters.
    #[must_use]
    pub fn with_parameters(
        operation: impl Into<String>,
        parameters: BTreeMap<String, String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            parameters: Some(parameters),
        }
    }

    /// Returns the operation name.
    #[must_use]
    pub const fn operation(&self) -> &str {
        self.operation.as_str()
    }

    /// Returns the parameter map, if any.
    #[must_use]
    pub const fn parameters(&self) -> Option<&BTreeMap<String, String>> {
        self.parameters.as_ref()
    }

    /// Looks up a single parameter.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .as_ref()
            .and_then(|parameters| parameters.get(key))
            .map(String::as_str)
    }

    /// Serialises the descriptor inside the bridge's operation envelope.
    ///
    /// # Errors
    ///
    /// Returns the serialiser error; in practice this cannot fail for
    /// string-only content.
    pub fn to_command_argument(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&OperationEnvelope {
            message_type: OPERATION_MESSAGE_TYPE,
            message: OperationMessage {
                operation: &self.operation,
                parameter: self.parameters.as_ref(),
            },
        })
    }
}

#[derive(Serialize)]
struct OperationEnvelope<'a> {
    message_type: &'static str,
    message: OperationMessage<'a>,
}

#[derive(Serialize)]
struct OperationMessage<'a> {
    operation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter: Option<&'a BTreeMap<String, String>>,
}

/// Result printed by the bridge CLI.
///
/// Only `response_type` is mandatory. Failed operations carry
/// `response.error_message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDocument {
    response_type: String,
    #[serde(default)]
    response: serde_json::Value,
}

impl ResponseDocument {
    /// Creates a bare success response.
    #[must_use]
    pub fn success() -> Self {
        Self {
            response_type: SUCCESS_RESPONSE_TYPE.to_owned(),
            response: serde_json::Value::Null,
        }
    }

    /// Creates an error response carrying a message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            response_type: ERROR_RESPONSE_TYPE.to_owned(),
            response: serde_json::json!({ "error_message": message.into() }),
        }
    }

    /// Returns the raw response type.
    #[must_use]
    pub const fn response_type(&self) -> &str {
        self.response_type.as_str()
    }

    /// Returns the response body.
    #[must_use]
    pub const fn response(&self) -> &serde_json::Value {
        &self.response
    }

    /// Whether the CLI reported failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.response_type == ERROR_RESPONSE_TYPE
    }

    /// The error message of a failed operation, when the CLI supplied one.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.response
            .get("error_message")
            .and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests;
