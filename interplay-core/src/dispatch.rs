//! Routing host events to the acting actor's session.

use crate::actor::Actor;
use crate::event::{
    BlockType, ContainerOpen, InteractionEvent, Point, SignEdit, SignRead, SwitchHit, TileEdit,
    TileEditType,
};
use crate::guard;
use crate::handler::InteractionHandler;

impl<A: Actor> InteractionHandler<A> {
    /// Fast check run before building an event.
    fn accepts_events(&self) -> bool {
        !self.shared.is_disposed() && !self.shared.registry.is_empty_hint()
    }

    /// Deliver `event` to `actor`'s session.
    ///
    /// Returns whether the event was handled and the host should suppress
    /// its default processing. A callback that fails or panics is logged and
    /// treated as not handled; the session is left as it was.
    pub fn dispatch(&self, actor: &A, event: &InteractionEvent) -> bool {
        if !self.accepts_events() {
            return false;
        }

        let actor_id = actor.id();
        let kind = event.kind();
        let owner = self.shared.owner_key();
        if guard::is_reentrant(owner) {
            tracing::error!(
                actor = %actor_id,
                event = %kind,
                "Event dispatched from inside an interaction callback, ignoring"
            );
            return false;
        }

        let mut sessions = self.shared.registry.lock();
        if self.shared.is_disposed() {
            return false;
        }
        let Some(session) = sessions.get_mut(&actor_id) else {
            return false;
        };
        let session_id = session.id;
        let Some(callback) = session.callbacks.get_mut(&kind) else {
            return false;
        };

        let result = match guard::invoke(owner, || callback(actor, event)) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    actor = %actor_id,
                    name = actor.name(),
                    session = %session_id,
                    event = %kind,
                    error = %e,
                    "Interaction callback failed"
                );
                return false;
            }
        };

        if session.never_completes {
            session.remaining_ticks = self.shared.config.timeout_ticks;
        } else if result.completed {
            sessions.remove(&actor_id);
            tracing::debug!(actor = %actor_id, session = %session_id, "Interaction completed");
        }
        result.handled
    }

    pub fn handle_tile_edit(
        &self,
        actor: &A,
        edit_type: TileEditType,
        block_type: BlockType,
        location: Point,
        object_style: i32,
    ) -> bool {
        if !self.accepts_events() {
            return false;
        }
        self.dispatch(
            actor,
            &InteractionEvent::TileEdit(TileEdit {
                edit_type,
                block_type,
                location,
                object_style,
            }),
        )
    }

    pub fn handle_container_open(&self, actor: &A, location: Point) -> bool {
        if !self.accepts_events() {
            return false;
        }
        self.dispatch(actor, &InteractionEvent::ContainerOpen(ContainerOpen { location }))
    }

    pub fn handle_sign_edit(
        &self,
        actor: &A,
        sign_index: i16,
        location: Point,
        new_text: impl Into<String>,
    ) -> bool {
        if !self.accepts_events() {
            return false;
        }
        self.dispatch(
            actor,
            &InteractionEvent::SignEdit(SignEdit {
                sign_index,
                location,
                new_text: new_text.into(),
            }),
        )
    }

    pub fn handle_sign_read(&self, actor: &A, location: Point) -> bool {
        if !self.accepts_events() {
            return false;
        }
        self.dispatch(actor, &InteractionEvent::SignRead(SignRead { location }))
    }

    pub fn handle_switch_hit(&self, actor: &A, location: Point) -> bool {
        if !self.accepts_events() {
            return false;
        }
        self.dispatch(actor, &InteractionEvent::SwitchHit(SwitchHit { location }))
    }
}
