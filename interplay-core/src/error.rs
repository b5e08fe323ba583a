//! Error types for the interaction handler.

use thiserror::Error;

use crate::actor::ActorId;

/// Result type for handler operations.
pub type Result<T> = std::result::Result<T, InteractionError>;

/// Errors returned to the caller of an [`InteractionHandler`](crate::InteractionHandler).
///
/// Every variant indicates misuse by the integrating code. Failures inside
/// user callbacks never surface here; they are logged and contained at the
/// dispatch, watcher, and help boundaries.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("interaction handler has been disposed")]
    Disposed,

    #[error("command name \"{name}\" is already registered")]
    CommandAlreadyRegistered { name: String },

    #[error("command \"{name}\" is not registered")]
    CommandNotRegistered { name: String },

    #[error("interaction handler re-entered from inside a callback (actor {actor:?})")]
    Reentrant { actor: Option<ActorId> },

    #[error("no tokio runtime available to run timeout watchers")]
    NoRuntime,
}

impl InteractionError {
    /// Whether this error means the handler can no longer be used.
    pub const fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed)
    }
}
