//! Resolve-then-execute orchestration.
//!
//! [`ActionRunner`] is what the dispatcher calls on a key press. It resolves
//! the action through [`resolve`] and delegates the resulting descriptor to
//! an [`ActionExecutor`]. The executor abstraction lets tests return canned
//! responses without spawning processes.

use tracing::debug;

use crate::error::{ActionError, ExecutionError};
use crate::protocol::{ActionDescriptor, ResponseDocument, SettingsDocument};
use crate::resolver::resolve;

const RUNNER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runner");

/// Runs a resolved descriptor to completion.
///
/// The production implementation is
/// [`CliExecutor`](crate::process::CliExecutor).
pub trait ActionExecutor {
    /// Executes the descriptor and returns the response document.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] if the executable cannot be found or
    /// launched, exits with a non-zero status, times out, or prints something
    /// other than a response document.
    fn execute(&self, descriptor: &ActionDescriptor) -> Result<ResponseDocument, ExecutionError>;
}

impl<E: ActionExecutor + ?Sized> ActionExecutor for &E {
    fn execute(&self, descriptor: &ActionDescriptor) -> Result<ResponseDocument, ExecutionError> {
        (**self).execute(descriptor)
    }
}

/// Chains resolution and execution.
#[derive(Debug)]
pub struct ActionRunner<E> {
    executor: E,
}

impl<E> ActionRunner<E> {
    /// Creates a runner around the given executor.
    #[must_use]
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: ActionExecutor> ActionRunner<E> {
    /// Resolves `action_id` against `settings` and executes the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Resolution`] when the action cannot be resolved,
    /// in which case the executor is never called, or
    /// [`ActionError::Execution`] when the executor fails.
    pub fn run(
        &self,
        action_id: &str,
        settings: &SettingsDocument,
    ) -> Result<ResponseDocument, ActionError> {
        let descriptor = resolve(action_id, settings)?;
        debug!(
            target: RUNNER_TARGET,
            action = action_id,
            operation = descriptor.operation(),
            "resolved action"
        );
        Ok(self.executor.execute(&descriptor)?)
    }
}
