//! The actor → session map and its single lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::actor::ActorId;
use crate::session::{Session, SessionId};

/// Map from actor to its active session, guarded by one mutex.
///
/// The session count is mirrored into an atomic so dispatch can bail out
/// without taking the lock when nobody is interacting.
pub(crate) struct SessionRegistry<A> {
    sessions: Mutex<HashMap<ActorId, Session<A>>>,
    len: AtomicUsize,
}

impl<A> SessionRegistry<A> {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            len: AtomicUsize::new(0),
        }
    }

    /// Lock-free emptiness check. May be stale; callers re-check under the lock.
    pub(crate) fn is_empty_hint(&self) -> bool {
        self.len.load(Ordering::Acquire) == 0
    }

    pub(crate) fn lock(&self) -> RegistryGuard<'_, A> {
        // User callbacks run inside catch_unwind, so a poisoned lock cannot
        // hold a half-applied mutation.
        let sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        RegistryGuard {
            sessions,
            len: &self.len,
        }
    }

    /// Lock only if nobody else holds it.
    pub(crate) fn try_lock(&self) -> Option<RegistryGuard<'_, A>> {
        let sessions = match self.sessions.try_lock() {
            Ok(sessions) => sessions,
            Err(std::sync::TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(std::sync::TryLockError::WouldBlock) => return None,
        };
        Some(RegistryGuard {
            sessions,
            len: &self.len,
        })
    }
}

/// Exclusive access to the session map. Keeps the mirrored count in sync.
pub(crate) struct RegistryGuard<'a, A> {
    sessions: MutexGuard<'a, HashMap<ActorId, Session<A>>>,
    len: &'a AtomicUsize,
}

impl<A> RegistryGuard<'_, A> {
    fn sync_len(&self) {
        self.len.store(self.sessions.len(), Ordering::Release);
    }

    pub(crate) fn get(&self, actor: &ActorId) -> Option<&Session<A>> {
        self.sessions.get(actor)
    }

    pub(crate) fn get_mut(&mut self, actor: &ActorId) -> Option<&mut Session<A>> {
        self.sessions.get_mut(actor)
    }

    /// Whether `actor`'s registered session is exactly `id`.
    pub(crate) fn is_current(&self, actor: &ActorId, id: SessionId) -> bool {
        self.sessions.get(actor).is_some_and(|s| s.id == id)
    }

    /// Register a session, returning the one it supersedes.
    pub(crate) fn insert(&mut self, actor: ActorId, session: Session<A>) -> Option<Session<A>> {
        let previous = self.sessions.insert(actor, session);
        self.sync_len();
        previous
    }

    pub(crate) fn remove(&mut self, actor: &ActorId) -> Option<Session<A>> {
        let removed = self.sessions.remove(actor);
        self.sync_len();
        removed
    }

    /// Remove every session, returning how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();
        self.sync_len();
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}
