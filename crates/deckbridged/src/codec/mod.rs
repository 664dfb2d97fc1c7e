//! JSON vocabulary spoken with the control-panel host.
//!
//! Inbound messages are decoded leniently: a string field that is absent or
//! of the wrong type reads as `""`, and a sub-document that is absent or not an
//! object reads as `{}`. Only a message that is not a JSON object at all is
//! rejected. Outbound messages are a closed set of [`OutboundMessage`]
//! variants serialised with their `event` name as the tag.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// A JSON object received from or sent to the host.
pub type JsonObject = Map<String, Value>;

/// Prefix the host expects on inline PNG images.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Failure to decode an inbound message.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not JSON.
    #[error("inbound message is not valid JSON: {source}")]
    InvalidJson {
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// The text is JSON but not an object.
    #[error("inbound message is not a JSON object")]
    NotAnObject,
}

/// Inbound events the plugin routes. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum EventKind {
    /// A key was pressed.
    KeyDown,
    /// A key was released.
    KeyUp,
    /// An action instance became visible.
    WillAppear,
    /// An action instance was hidden.
    WillDisappear,
    /// A device was attached.
    DeviceDidConnect,
    /// A device was detached.
    DeviceDidDisconnect,
    /// The host delivered the plugin's global settings.
    DidReceiveGlobalSettings,
    /// The property inspector sent data to the plugin.
    SendToPlugin,
}

/// Decoded inbound message with every field defaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundMessage {
    /// Wire event name.
    pub event: String,
    /// Context of the control that raised the event.
    pub context: String,
    /// Action identifier of the control.
    pub action: String,
    /// Device identifier.
    pub device: String,
    /// `payload` sub-document.
    pub payload: JsonObject,
    /// `deviceInfo` sub-document.
    pub device_info: JsonObject,
}

impl InboundMessage {
    /// Routed kind of the event, or `None` for events the plugin ignores.
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        self.event.parse().ok()
    }
}

/// Decodes one inbound text message.
///
/// # Errors
///
/// Returns [`CodecError`] when the text is not a JSON object.
pub fn decode(text: &str) -> Result<InboundMessage, CodecError> {
    let value: Value =
        serde_json::from_str(text).map_err(|source| CodecError::InvalidJson { source })?;
    let Value::Object(object) = value else {
        return Err(CodecError::NotAnObject);
    };

    Ok(InboundMessage {
        event: string_field(&object, "event"),
        context: string_field(&object, "context"),
        action: string_field(&object, "action"),
        device: string_field(&object, "device"),
        payload: object_field(&object, "payload"),
        device_info: object_field(&object, "deviceInfo"),
    })
}

/// Reads a string member, defaulting to `""`.
#[must_use]
pub fn string_field(object: &JsonObject, name: &str) -> String {
    object
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Reads an object member, defaulting to `{}`.
#[must_use]
pub fn object_field(object: &JsonObject, name: &str) -> JsonObject {
    object
        .get(name)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Which surfaces a title or image applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    /// Both the physical key and the software display.
    #[default]
    HardwareAndSoftware,
    /// The physical key only.
    Hardware,
    /// The software display only.
    Software,
}

impl Target {
    /// Integer code used on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::HardwareAndSoftware => 0,
            Self::Hardware => 1,
            Self::Software => 2,
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Registration sent immediately after the channel connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Registration event name supplied at startup.
    pub event: String,
    /// Plugin identifier supplied at startup.
    pub uuid: String,
}

/// Payload of `setTitle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitlePayload {
    /// Surfaces to update.
    pub target: Target,
    /// New title; empty clears it.
    pub title: String,
}

/// Payload of `setImage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePayload {
    /// Surfaces to update.
    pub target: Target,
    /// PNG data URL; empty clears the image.
    pub image: String,
}

impl ImagePayload {
    /// Builds the payload, adding the PNG data URL prefix when it is missing.
    #[must_use]
    pub fn new(image: &str, target: Target) -> Self {
        let image = if image.is_empty() || image.starts_with(PNG_DATA_URL_PREFIX) {
            image.to_owned()
        } else {
            format!("{PNG_DATA_URL_PREFIX}{image}")
        };
        Self { target, image }
    }
}

/// Payload of `setState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatePayload {
    /// Zero-based state index.
    pub state: u32,
}

/// Payload of `switchToProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePayload {
    /// Profile name.
    pub profile: String,
}

/// Payload of `logMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    /// Line to append to the host log.
    pub message: String,
}

/// Messages the plugin sends to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Changes the title of a control.
    SetTitle {
        /// Target control.
        context: String,
        /// Title and surfaces.
        payload: TitlePayload,
    },
    /// Changes the image of a control.
    SetImage {
        /// Target control.
        context: String,
        /// Image and surfaces.
        payload: ImagePayload,
    },
    /// Flashes the alert indicator on a control.
    ShowAlert {
        /// Target control.
        context: String,
    },
    /// Flashes the success indicator on a control.
    ShowOk {
        /// Target control.
        context: String,
    },
    /// Persists the settings of a control.
    SetSettings {
        /// Target control.
        context: String,
        /// Settings document.
        payload: JsonObject,
    },
    /// Switches a multi-state control.
    SetState {
        /// Target control.
        context: String,
        /// New state.
        payload: StatePayload,
    },
    /// Forwards data to the property inspector of a control.
    SendToPropertyInspector {
        /// Target control.
        context: String,
        /// Action identifier of the control.
        action: String,
        /// Arbitrary document.
        payload: Value,
    },
    /// Switches a device to another profile.
    SwitchToProfile {
        /// Plugin identifier.
        context: String,
        /// Device to switch.
        device: String,
        /// Profile to switch to; omitted to return to the previous one.
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<ProfilePayload>,
    },
    /// Appends a line to the host log.
    LogMessage {
        /// Line to log.
        payload: MessagePayload,
    },
}

impl OutboundMessage {
    /// Wire event name.
    #[must_use]
    pub const fn event(&self) -> &'static str {
        match self {
            Self::SetTitle { .. } => "setTitle",
            Self::SetImage { .. } => "setImage",
            Self::ShowAlert { .. } => "showAlert",
            Self::ShowOk { .. } => "showOk",
            Self::SetSettings { .. } => "setSettings",
            Self::SetState { .. } => "setState",
            Self::SendToPropertyInspector { .. } => "sendToPropertyInspector",
            Self::SwitchToProfile { .. } => "switchToProfile",
            Self::LogMessage { .. } => "logMessage",
        }
    }
}

/// Serialises a message for the wire.
///
/// # Errors
///
/// Returns the serialiser error.
pub fn encode<T: Serialize + ?Sized>(message: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
