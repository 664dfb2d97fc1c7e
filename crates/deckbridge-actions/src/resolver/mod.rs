//! Mapping from host action identifiers to bridge operations.
//!
//! Resolution is pure: the same identifier and settings always produce the
//! same descriptor or the same error.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::ResolutionError;
use crate::protocol::{ActionDescriptor, SettingsDocument};

/// Actions declared in the plugin manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownAction {
    /// Toggle the local user's microphone mute.
    ToggleLocalUserMute,
    /// Toggle the local user's deafened state.
    ToggleLocalUserDeaf,
    /// Move the local user into a named channel.
    JoinChannel,
}

impl KnownAction {
    /// Every action in the table.
    pub const ALL: [Self; 3] = [
        Self::ToggleLocalUserMute,
        Self::ToggleLocalUserDeaf,
        Self::JoinChannel,
    ];

    /// Looks up an action by its manifest identifier.
    #[must_use]
    pub fn from_id(action_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == action_id)
    }

    /// Manifest identifier the host reports in `action`.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ToggleLocalUserMute => "info.mumble.streamdeck.togglelocalusermute",
            Self::ToggleLocalUserDeaf => "info.mumble.streamdeck.togglelocaluserdeaf",
            Self::JoinChannel => "info.mumble.streamdeck.joinchannel",
        }
    }

    /// Bridge operation the action maps to.
    #[must_use]
    pub const fn operation(self) -> &'static str {
        match self {
            Self::ToggleLocalUserMute => "toggle_local_user_mute",
            Self::ToggleLocalUserDeaf => "toggle_local_user_deaf",
            Self::JoinChannel => "move_local_user",
        }
    }
}

/// Settings consulted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    /// Target channel of the join-channel action.
    ChannelName,
    /// Password of the target channel; may be empty.
    ChannelPassword,
}

impl SettingField {
    /// Key of the field in the settings document.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ChannelName => "channel_name",
            Self::ChannelPassword => "password",
        }
    }

    /// Parameter name the field is forwarded under.
    const fn parameter(self) -> &'static str {
        match self {
            Self::ChannelName => "channel",
            Self::ChannelPassword => "password",
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelName => f.write_str("channel name"),
            Self::ChannelPassword => f.write_str("channel password"),
        }
    }
}

const JOIN_CHANNEL_FIELDS: [SettingField; 2] =
    [SettingField::ChannelName, SettingField::ChannelPassword];

/// Resolves an action identifier against the current settings.
///
/// # Errors
///
/// Returns [`ResolutionError::UnknownAction`] for identifiers outside the
/// table, and a setting error when the join-channel action lacks either of
/// its fields or one of them is not a string.
///
/// # Example
///
/// ```
/// use deckbridge_actions::{resolve, SettingsDocument};
///
/// let mut settings = SettingsDocument::new();
/// settings.insert("channel_name".into(), "General".into());
/// settings.insert("password".into(), "".into());
///
/// let descriptor = resolve("info.mumble.streamdeck.joinchannel", &settings).unwrap();
/// assert_eq!(descriptor.operation(), "move_local_user");
/// assert_eq!(descriptor.parameter("channel"), Some("General"));
/// ```
pub fn resolve(
    action_id: &str,
    settings: &SettingsDocument,
) -> Result<ActionDescriptor, ResolutionError> {
    let action = KnownAction::from_id(action_id).ok_or_else(|| ResolutionError::UnknownAction {
        action: action_id.to_owned(),
    })?;

    match action {
        KnownAction::ToggleLocalUserMute | KnownAction::ToggleLocalUserDeaf => {
            Ok(ActionDescriptor::new(action.operation()))
        }
        KnownAction::JoinChannel => resolve_join_channel(settings),
    }
}

fn resolve_join_channel(settings: &SettingsDocument) -> Result<ActionDescriptor, ResolutionError> {
    for field in JOIN_CHANNEL_FIELDS {
        if !settings.contains_key(field.key()) {
            return Err(ResolutionError::MissingSetting { field });
        }
    }

    let mut parameters = BTreeMap::new();
    for field in JOIN_CHANNEL_FIELDS {
        let value = string_setting(settings, field)?;
        parameters.insert(field.parameter().to_owned(), value.to_owned());
    }

    Ok(ActionDescriptor::with_parameters(
        KnownAction::JoinChannel.operation(),
        parameters,
    ))
}

fn string_setting(settings: &SettingsDocument, field: SettingField) -> Result<&str, ResolutionError> {
    match settings.get(field.key()) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(ResolutionError::InvalidSettingType { field }),
        None => Err(ResolutionError::MissingSetting { field }),
    }
}
