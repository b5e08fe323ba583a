//! The interaction handler: session lifecycle, command ownership, teardown.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::actor::{Actor, ActorId};
use crate::command::{Command, CommandArgs, CommandHost, CommandRegistry};
use crate::config::HandlerConfig;
use crate::error::{InteractionError, Result};
use crate::guard;
use crate::interaction::Interaction;
use crate::registry::SessionRegistry;
use crate::session::{Session, SessionHandle, SessionId, WatcherHandle};
use crate::watcher;

const ACTIVE: u8 = 0;
const DISPOSING: u8 = 1;
const DISPOSED: u8 = 2;

/// Lifecycle of an [`InteractionHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Disposing,
    Disposed,
}

/// State shared between the handler, its session handles, and the watchers.
pub(crate) struct Shared<A> {
    pub(crate) registry: SessionRegistry<A>,
    pub(crate) config: HandlerConfig,
    pub(crate) runtime: Handle,
    state: AtomicU8,
    next_session: AtomicU64,
}

impl<A> Shared<A> {
    /// True from the moment disposal starts.
    pub(crate) fn is_disposed(&self) -> bool {
        self.state.load(Ordering::Acquire) != ACTIVE
    }

    pub(crate) fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::Acquire) {
            ACTIVE => LifecycleState::Active,
            DISPOSING => LifecycleState::Disposing,
            _ => LifecycleState::Disposed,
        }
    }

    /// Key identifying this handler in the re-entrancy guard.
    pub(crate) fn owner_key(&self) -> usize {
        self as *const Self as usize
    }

    /// Claim disposal. Only the first caller gets `true`.
    fn begin_disposal(&self) -> bool {
        self.state
            .compare_exchange(ACTIVE, DISPOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish_disposal(&self) {
        self.state.store(DISPOSED, Ordering::Release);
    }
}

/// Builder for [`InteractionHandler`].
pub struct InteractionHandlerBuilder<A: Actor> {
    host: Arc<dyn CommandHost<A>>,
    config: HandlerConfig,
    runtime: Option<Handle>,
}

impl<A: Actor> InteractionHandlerBuilder<A> {
    pub fn config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runtime the timeout watchers run on. Defaults to the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Create the handler and take over the host's help command.
    pub fn build(self) -> Result<InteractionHandler<A>> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| InteractionError::NoRuntime)?,
        };

        let commands = CommandRegistry::new(Arc::clone(&self.host), &self.config);
        let shared = Arc::new(Shared {
            registry: SessionRegistry::new(),
            config: self.config,
            runtime,
            state: AtomicU8::new(ACTIVE),
            next_session: AtomicU64::new(1),
        });

        tracing::info!(
            timeout_ticks = shared.config.timeout_ticks,
            help_overridden = commands.help_overridden(),
            "Interaction handler ready"
        );
        Ok(InteractionHandler { shared, commands })
    }
}

/// Tracks one interactive session per actor and routes host events to it.
///
/// Call [`dispose`](Self::dispose) when the owning plugin unloads. Dropping
/// the handler performs best-effort cleanup, but command closures that
/// capture the handler keep it alive, so drop alone may never run.
pub struct InteractionHandler<A: Actor> {
    pub(crate) shared: Arc<Shared<A>>,
    commands: CommandRegistry<A>,
}

impl<A: Actor> InteractionHandler<A> {
    pub fn builder(host: Arc<dyn CommandHost<A>>) -> InteractionHandlerBuilder<A> {
        InteractionHandlerBuilder {
            host,
            config: HandlerConfig::default(),
            runtime: None,
        }
    }

    /// Handler with default settings on the current tokio runtime.
    pub fn new(host: Arc<dyn CommandHost<A>>) -> Result<Self> {
        Self::builder(host).build()
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.shared.config
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    fn ensure_usable(&self, actor: Option<ActorId>) -> Result<()> {
        if self.shared.is_disposed() {
            return Err(InteractionError::Disposed);
        }
        if guard::is_reentrant(self.shared.owner_key()) {
            tracing::error!(?actor, "Interaction handler re-entered from a callback");
            return Err(InteractionError::Reentrant { actor });
        }
        Ok(())
    }

    /// Start a session for `actor`, superseding any session it already has.
    ///
    /// The superseded session is discarded silently: its expiry callback does
    /// not run and its watcher stops without touching the new session.
    pub fn start_or_reset(
        &self,
        actor: Arc<A>,
        interaction: Interaction<A>,
    ) -> Result<SessionHandle<A>> {
        let actor_id = actor.id();
        self.ensure_usable(Some(actor_id))?;

        let mut sessions = self.shared.registry.lock();
        if self.shared.is_disposed() {
            return Err(InteractionError::Disposed);
        }

        let id = SessionId::next(&self.shared.next_session);
        let watcher = WatcherHandle::new();
        let cancelled = watcher.token();
        let session = Session::new(
            id,
            actor,
            interaction,
            self.shared.config.timeout_ticks,
            watcher,
        );

        if let Some(previous) = sessions.insert(actor_id, session) {
            tracing::debug!(
                actor = %actor_id,
                superseded = %previous.id,
                session = %id,
                "Interaction superseded"
            );
        }
        // Spawned under the lock: the watcher's first tick already sees the
        // session registered.
        watcher::spawn(&self.shared, actor_id, id, cancelled);
        drop(sessions);

        tracing::debug!(actor = %actor_id, session = %id, "Interaction started");
        Ok(SessionHandle::new(Arc::downgrade(&self.shared), actor_id, id))
    }

    /// End `actor`'s session without running its expiry callback.
    ///
    /// Returns whether a session was active.
    pub fn stop(&self, actor: ActorId) -> Result<bool> {
        self.ensure_usable(Some(actor))?;
        let removed = self.shared.registry.lock().remove(&actor);
        if let Some(session) = &removed {
            tracing::debug!(actor = %actor, session = %session.id, "Interaction stopped");
        }
        Ok(removed.is_some())
    }

    /// Whether `actor` has a session. `false` once disposed.
    pub fn is_active(&self, actor: ActorId) -> bool {
        self.remaining_ticks(actor).is_some()
    }

    /// Ticks left on `actor`'s session.
    pub fn remaining_ticks(&self, actor: ActorId) -> Option<i64> {
        self.ensure_usable(Some(actor)).ok()?;
        self.shared
            .registry
            .lock()
            .get(&actor)
            .map(|s| s.remaining_ticks)
    }

    /// Number of actors with an active session.
    pub fn active_count(&self) -> usize {
        if self.ensure_usable(None).is_err() {
            return 0;
        }
        self.shared.registry.lock().len()
    }

    /// Add `command` to the host. Fails if any of its names is taken.
    pub fn register_command(&self, command: Arc<Command<A>>) -> Result<()> {
        self.ensure_usable(None)?;
        self.commands.register(command, None)
    }

    /// Add `command` to the host and answer `/help <name>` with `help`.
    pub fn register_command_with_help<F>(&self, command: Arc<Command<A>>, help: F) -> Result<()>
    where
        F: Fn(&CommandArgs<A>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.ensure_usable(None)?;
        self.commands.register(command, Some(Arc::new(help)))
    }

    /// Remove `command` from the host and forget its help callback.
    pub fn deregister_command(&self, command: &Arc<Command<A>>) -> Result<()> {
        self.ensure_usable(None)?;
        self.commands.deregister(command)
    }

    /// Tear down: drop every session without expiry callbacks, remove the
    /// handler's commands, and restore the original help command.
    ///
    /// Idempotent. Must not be called from inside an interaction callback.
    pub fn dispose(&self) -> Result<()> {
        if guard::is_reentrant(self.shared.owner_key()) {
            return Err(InteractionError::Reentrant { actor: None });
        }
        if !self.shared.begin_disposal() {
            return Ok(());
        }

        // Dropping the sessions flags their watchers; the lock is held so no
        // dispatch or watcher tick can observe a half-cleared map.
        let cleared = self.shared.registry.lock().clear();
        self.commands.teardown();
        self.shared.finish_disposal();

        tracing::info!(sessions = cleared, "Interaction handler disposed");
        Ok(())
    }
}

impl<A: Actor> Drop for InteractionHandler<A> {
    fn drop(&mut self) {
        if !self.shared.begin_disposal() {
            return;
        }
        tracing::warn!("Interaction handler dropped without dispose()");

        // Never block in drop. Sessions left behind are freed with `Shared`
        // and their watchers see the disposed state.
        if let Some(mut sessions) = self.shared.registry.try_lock() {
            sessions.clear();
        }
        self.commands.teardown();
        self.shared.finish_disposal();
    }
}

impl<A: Actor> std::fmt::Debug for InteractionHandler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionHandler")
            .field("state", &self.state())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
