//! Per-actor session state and the caller-facing session handle.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::actor::{Actor, ActorId};
use crate::event::{ContainerOpen, EventKind, SignEdit, SignRead, SwitchHit, TileEdit};
use crate::guard;
use crate::handler::Shared;
use crate::interaction::{
    self, CallbackResult, EventCallback, ExpireCallback, FnCallback, Interaction,
};

/// Identity of one session instance.
///
/// Unique per handler and never reused, so a watcher can tell its own session
/// apart from one that superseded it for the same actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn next(counter: &AtomicU64) -> Self {
        Self(counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Link from a session to its timeout watcher.
///
/// The watcher task polls the shared flag; nothing ever aborts it.
pub(crate) struct WatcherHandle {
    cancelled: Arc<AtomicBool>,
}

impl WatcherHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag the watcher task observes.
    pub(crate) fn token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Ask the watcher to stop at its next tick.
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

pub(crate) struct Session<A> {
    pub(crate) id: SessionId,
    pub(crate) actor: Arc<A>,
    pub(crate) remaining_ticks: i64,
    pub(crate) never_completes: bool,
    pub(crate) callbacks: HashMap<EventKind, EventCallback<A>>,
    pub(crate) on_expire: Option<ExpireCallback<A>>,
    pub(crate) watcher: WatcherHandle,
}

impl<A> Session<A> {
    pub(crate) fn new(
        id: SessionId,
        actor: Arc<A>,
        interaction: Interaction<A>,
        timeout_ticks: i64,
        watcher: WatcherHandle,
    ) -> Self {
        Self {
            id,
            actor,
            remaining_ticks: timeout_ticks,
            never_completes: interaction.never_completes,
            callbacks: interaction.callbacks,
            on_expire: interaction.on_expire,
            watcher,
        }
    }
}

// Whatever path removes a session from the registry, its watcher winds down.
impl<A> Drop for Session<A> {
    fn drop(&mut self) {
        self.watcher.cancel();
    }
}

/// Handle to a started session.
///
/// Every operation applies only while this exact session is still the
/// actor's registered one; once it has been superseded, stopped, completed,
/// expired, or disposed the setters return `false`.
pub struct SessionHandle<A: Actor> {
    shared: Weak<Shared<A>>,
    actor: ActorId,
    id: SessionId,
}

impl<A: Actor> SessionHandle<A> {
    pub(crate) fn new(shared: Weak<Shared<A>>, actor: ActorId, id: SessionId) -> Self {
        Self { shared, actor, id }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Session<A>) -> R) -> Option<R> {
        let shared = self.shared.upgrade()?;
        if shared.is_disposed() {
            return None;
        }
        if guard::is_reentrant(shared.owner_key()) {
            tracing::warn!(
                actor = %self.actor,
                session = %self.id,
                "Session handle used from inside a callback, ignoring"
            );
            return None;
        }

        let mut sessions = shared.registry.lock();
        let session = sessions.get_mut(&self.actor).filter(|s| s.id == self.id)?;
        Some(f(session))
    }

    /// Whether this session is still the actor's active one.
    pub fn is_active(&self) -> bool {
        self.with_session(|_| ()).is_some()
    }

    /// Ticks left before expiry.
    pub fn remaining_ticks(&self) -> Option<i64> {
        self.with_session(|s| s.remaining_ticks)
    }

    pub fn set_never_completes(&self, never_completes: bool) -> bool {
        self.with_session(|s| s.never_completes = never_completes)
            .is_some()
    }

    pub fn set_on_expire<F>(&self, callback: F) -> bool
    where
        F: FnOnce(&A) -> anyhow::Result<()> + Send + 'static,
    {
        self.with_session(|s| s.on_expire = Some(Box::new(callback)))
            .is_some()
    }

    pub fn on_tile_edit<F>(&self, callback: F) -> bool
    where
        F: FnMut(&A, &TileEdit) -> CallbackResult + Send + 'static,
    {
        self.set_callback(EventKind::TileEdit, interaction::erase_tile_edit(FnCallback(callback)))
    }

    pub fn on_container_open<F>(&self, callback: F) -> bool
    where
        F: FnMut(&A, &ContainerOpen) -> CallbackResult + Send + 'static,
    {
        self.set_callback(
            EventKind::ContainerOpen,
            interaction::erase_container_open(FnCallback(callback)),
        )
    }

    pub fn on_sign_edit<F>(&self, callback: F) -> bool
    where
        F: FnMut(&A, &SignEdit) -> CallbackResult + Send + 'static,
    {
        self.set_callback(EventKind::SignEdit, interaction::erase_sign_edit(FnCallback(callback)))
    }

    pub fn on_sign_read<F>(&self, callback: F) -> bool
    where
        F: FnMut(&A, &SignRead) -> CallbackResult + Send + 'static,
    {
        self.set_callback(EventKind::SignRead, interaction::erase_sign_read(FnCallback(callback)))
    }

    pub fn on_switch_hit<F>(&self, callback: F) -> bool
    where
        F: FnMut(&A, &SwitchHit) -> CallbackResult + Send + 'static,
    {
        self.set_callback(
            EventKind::SwitchHit,
            interaction::erase_switch_hit(FnCallback(callback)),
        )
    }

    /// Stop reacting to `kind`.
    pub fn clear_callback(&self, kind: EventKind) -> bool {
        self.with_session(|s| s.callbacks.remove(&kind).is_some())
            .unwrap_or(false)
    }

    fn set_callback(&self, kind: EventKind, callback: EventCallback<A>) -> bool {
        self.with_session(|s| {
            s.callbacks.insert(kind, callback);
        })
        .is_some()
    }

    /// End this session without firing its expiry callback.
    pub fn stop(&self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        if shared.is_disposed() || guard::is_reentrant(shared.owner_key()) {
            return false;
        }

        let mut sessions = shared.registry.lock();
        if sessions.is_current(&self.actor, self.id) {
            sessions.remove(&self.actor);
            tracing::debug!(actor = %self.actor, session = %self.id, "Interaction stopped");
            true
        } else {
            false
        }
    }
}

impl<A: Actor> fmt::Debug for SessionHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("actor", &self.actor)
            .field("id", &self.id)
            .finish()
    }
}
