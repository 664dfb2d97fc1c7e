//! Action resolution and execution for the deckbridge plugin.
//!
//! A key press on the control panel names an action by identifier. This crate
//! turns that identifier, together with the settings the user entered for the
//! key, into an [`ActionDescriptor`], hands the descriptor to the external
//! Mumble JSON bridge CLI, and returns the [`ResponseDocument`] the CLI
//! printed.
//!
//! # Architecture
//!
//! * [`resolver`] is a pure table from action identifiers to operations, with
//!   per-action settings validation.
//! * [`runner::ActionExecutor`] abstracts the process boundary so callers can
//!   substitute test doubles; [`process::CliExecutor`] is the production
//!   implementation that spawns `<cli> --json <descriptor>`.
//! * [`runner::ActionRunner`] chains the two and is what the dispatcher calls.
//!
//! # Example
//!
//! ```rust
//! use deckbridge_actions::{ActionRunner, ResponseDocument, SettingsDocument};
//! use deckbridge_actions::runner::ActionExecutor;
//! use deckbridge_actions::{ActionDescriptor, ExecutionError};
//!
//! struct AlwaysSucceeds;
//!
//! impl ActionExecutor for AlwaysSucceeds {
//!     fn execute(&self, _descriptor: &ActionDescriptor) -> Result<ResponseDocument, ExecutionError> {
//!         Ok(ResponseDocument::success())
//!     }
//! }
//!
//! let runner = ActionRunner::new(AlwaysSucceeds);
//! let response = runner
//!     .run("info.mumble.streamdeck.togglelocalusermute", &SettingsDocument::new())
//!     .expect("toggle mute resolves and runs");
//! assert!(!response.is_error());
//! ```

pub mod error;
pub mod process;
pub mod protocol;
pub mod resolver;
pub mod runner;

#[cfg(test)]
mod tests;

pub use self::error::{ActionError, ExecutionError, ResolutionError};
pub use self::process::CliExecutor;
pub use self::protocol::{ActionDescriptor, ResponseDocument, SettingsDocument};
pub use self::resolver::{KnownAction, SettingField, resolve};
pub use self::runner::{ActionExecutor, ActionRunner};
