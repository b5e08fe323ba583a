//! Actor abstraction supplied by the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a connected actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A connected participant the host can identify and message.
///
/// Implemented by the host's connection type. Messaging must not block; it
/// may be called while the session registry lock is held.
pub trait Actor: Send + Sync + 'static {
    /// Identity used to key the actor's session.
    fn id(&self) -> ActorId;

    /// Display name for logs.
    fn name(&self) -> &str;

    /// Whether the connection is still alive. Expiry callbacks are skipped
    /// for disconnected actors.
    fn is_connected(&self) -> bool;

    /// Send an informational message.
    fn send_info_message(&self, message: &str);

    /// Send an error message.
    fn send_error_message(&self, message: &str);
}
