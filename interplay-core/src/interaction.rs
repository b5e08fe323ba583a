//! Interaction descriptions: what a session reacts to and how it ends.

use std::collections::HashMap;
use std::fmt;

use crate::event::{
    ContainerOpen, EventKind, InteractionEvent, SignEdit, SignRead, SwitchHit, TileEdit,
};

/// Outcome reported by an interaction callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionResult {
    /// The event was consumed; the host should skip its default handling.
    pub handled: bool,
    /// The interaction is finished and its session should end.
    pub completed: bool,
}

impl InteractionResult {
    pub const fn new(handled: bool, completed: bool) -> Self {
        Self { handled, completed }
    }

    /// Consumed the event, interaction continues.
    pub const fn handled() -> Self {
        Self::new(true, false)
    }

    /// Consumed the event and finished the interaction.
    pub const fn completed() -> Self {
        Self::new(true, true)
    }

    /// Let the host handle the event, interaction continues.
    pub const fn not_handled() -> Self {
        Self::new(false, false)
    }
}

/// Result type returned by every interaction callback.
pub type CallbackResult = anyhow::Result<InteractionResult>;

/// Handles tile edits for an interaction.
pub trait TileEditCallback<A>: Send + 'static {
    fn on_tile_edit(&mut self, actor: &A, edit: &TileEdit) -> CallbackResult;
}

/// Handles container opens for an interaction.
pub trait ContainerOpenCallback<A>: Send + 'static {
    fn on_container_open(&mut self, actor: &A, event: &ContainerOpen) -> CallbackResult;
}

/// Handles sign edits for an interaction.
pub trait SignEditCallback<A>: Send + 'static {
    fn on_sign_edit(&mut self, actor: &A, event: &SignEdit) -> CallbackResult;
}

/// Handles sign reads for an interaction.
pub trait SignReadCallback<A>: Send + 'static {
    fn on_sign_read(&mut self, actor: &A, event: &SignRead) -> CallbackResult;
}

/// Handles switch hits for an interaction.
pub trait SwitchHitCallback<A>: Send + 'static {
    fn on_switch_hit(&mut self, actor: &A, event: &SwitchHit) -> CallbackResult;
}

pub(crate) type EventCallback<A> =
    Box<dyn FnMut(&A, &InteractionEvent) -> CallbackResult + Send + 'static>;

pub(crate) type ExpireCallback<A> = Box<dyn FnOnce(&A) -> anyhow::Result<()> + Send + 'static>;

// Each erased callback is stored under the kind it was built for, so the
// fallthrough arm only runs if the table is keyed wrongly.
macro_rules! erase {
    ($variant:ident, $handler:ident, $method:ident) => {{
        let mut handler = $handler;
        Box::new(move |actor: &A, event: &InteractionEvent| match event {
            InteractionEvent::$variant(payload) => handler.$method(actor, payload),
            _ => Ok(InteractionResult::not_handled()),
        })
    }};
}

pub(crate) fn erase_tile_edit<A, H>(handler: H) -> EventCallback<A>
where
    A: 'static,
    H: TileEditCallback<A>,
{
    erase!(TileEdit, handler, on_tile_edit)
}

pub(crate) fn erase_container_open<A, H>(handler: H) -> EventCallback<A>
where
    A: 'static,
    H: ContainerOpenCallback<A>,
{
    erase!(ContainerOpen, handler, on_container_open)
}

pub(crate) fn erase_sign_edit<A, H>(handler: H) -> EventCallback<A>
where
    A: 'static,
    H: SignEditCallback<A>,
{
    erase!(SignEdit, handler, on_sign_edit)
}

pub(crate) fn erase_sign_read<A, H>(handler: H) -> EventCallback<A>
where
    A: 'static,
    H: SignReadCallback<A>,
{
    erase!(SignRead, handler, on_sign_read)
}

pub(crate) fn erase_switch_hit<A, H>(handler: H) -> EventCallback<A>
where
    A: 'static,
    H: SwitchHitCallback<A>,
{
    erase!(SwitchHit, handler, on_switch_hit)
}

/// Adapts a closure to a capability trait.
pub(crate) struct FnCallback<F>(pub(crate) F);

impl<A, F> TileEditCallback<A> for FnCallback<F>
where
    F: FnMut(&A, &TileEdit) -> CallbackResult + Send + 'static,
{
    fn on_tile_edit(&mut self, actor: &A, edit: &TileEdit) -> CallbackResult {
        (self.0)(actor, edit)
    }
}

impl<A, F> ContainerOpenCallback<A> for FnCallback<F>
where
    F: FnMut(&A, &ContainerOpen) -> CallbackResult + Send + 'static,
{
    fn on_container_open(&mut self, actor: &A, event: &ContainerOpen) -> CallbackResult {
        (self.0)(actor, event)
    }
}

impl<A, F> SignEditCallback<A> for FnCallback<F>
where
    F: FnMut(&A, &SignEdit) -> CallbackResult + Send + 'static,
{
    fn on_sign_edit(&mut self, actor: &A, event: &SignEdit) -> CallbackResult {
        (self.0)(actor, event)
    }
}

impl<A, F> SignReadCallback<A> for FnCallback<F>
where
    F: FnMut(&A, &SignRead) -> CallbackResult + Send + 'static,
{
    fn on_sign_read(&mut self, actor: &A, event: &SignRead) -> CallbackResult {
        (self.0)(actor, event)
    }
}

impl<A, F> SwitchHitCallback<A> for FnCallback<F>
where
    F: FnMut(&A, &SwitchHit) -> CallbackResult + Send + 'static,
{
    fn on_switch_hit(&mut self, actor: &A, event: &SwitchHit) -> CallbackResult {
        (self.0)(actor, event)
    }
}

/// Description of an interaction, consumed by
/// [`InteractionHandler::start_or_reset`](crate::InteractionHandler::start_or_reset).
///
/// ```ignore
/// let interaction = Interaction::new()
///     .on_tile_edit(|actor, edit| {
///         actor.send_info_message(&format!("Selected {}", edit.location));
///         Ok(InteractionResult::completed())
///     })
///     .on_expire(|actor| {
///         actor.send_error_message("Waited too long.");
///         Ok(())
///     });
/// handler.start_or_reset(actor, interaction)?;
/// ```
pub struct Interaction<A> {
    pub(crate) callbacks: HashMap<EventKind, EventCallback<A>>,
    pub(crate) on_expire: Option<ExpireCallback<A>>,
    pub(crate) never_completes: bool,
}

impl<A: 'static> Interaction<A> {
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            on_expire: None,
            never_completes: false,
        }
    }

    /// Keep the session alive regardless of `completed`; every matching event
    /// restarts the countdown instead.
    pub fn never_completes(mut self) -> Self {
        self.never_completes = true;
        self
    }

    /// Callback for when the countdown runs out while the actor is connected.
    pub fn on_expire<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&A) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_expire = Some(Box::new(callback));
        self
    }

    pub fn on_tile_edit<F>(self, callback: F) -> Self
    where
        F: FnMut(&A, &TileEdit) -> CallbackResult + Send + 'static,
    {
        self.tile_edit_handler(FnCallback(callback))
    }

    pub fn on_container_open<F>(self, callback: F) -> Self
    where
        F: FnMut(&A, &ContainerOpen) -> CallbackResult + Send + 'static,
    {
        self.container_open_handler(FnCallback(callback))
    }

    pub fn on_sign_edit<F>(self, callback: F) -> Self
    where
        F: FnMut(&A, &SignEdit) -> CallbackResult + Send + 'static,
    {
        self.sign_edit_handler(FnCallback(callback))
    }

    pub fn on_sign_read<F>(self, callback: F) -> Self
    where
        F: FnMut(&A, &SignRead) -> CallbackResult + Send + 'static,
    {
        self.sign_read_handler(FnCallback(callback))
    }

    pub fn on_switch_hit<F>(self, callback: F) -> Self
    where
        F: FnMut(&A, &SwitchHit) -> CallbackResult + Send + 'static,
    {
        self.switch_hit_handler(FnCallback(callback))
    }

    pub fn tile_edit_handler<H: TileEditCallback<A>>(mut self, handler: H) -> Self {
        self.callbacks
            .insert(EventKind::TileEdit, erase_tile_edit(handler));
        self
    }

    pub fn container_open_handler<H: ContainerOpenCallback<A>>(mut self, handler: H) -> Self {
        self.callbacks
            .insert(EventKind::ContainerOpen, erase_container_open(handler));
        self
    }

    pub fn sign_edit_handler<H: SignEditCallback<A>>(mut self, handler: H) -> Self {
        self.callbacks
            .insert(EventKind::SignEdit, erase_sign_edit(handler));
        self
    }

    pub fn sign_read_handler<H: SignReadCallback<A>>(mut self, handler: H) -> Self {
        self.callbacks
            .insert(EventKind::SignRead, erase_sign_read(handler));
        self
    }

    pub fn switch_hit_handler<H: SwitchHitCallback<A>>(mut self, handler: H) -> Self {
        self.callbacks
            .insert(EventKind::SwitchHit, erase_switch_hit(handler));
        self
    }

    /// Whether a callback is registered for `kind`.
    pub fn handles(&self, kind: EventKind) -> bool {
        self.callbacks.contains_key(&kind)
    }
}

impl<A: 'static> Default for Interaction<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Interaction<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&EventKind> = self.callbacks.keys().collect();
        kinds.sort();
        f.debug_struct("Interaction")
            .field("callbacks", &kinds)
            .field("on_expire", &self.on_expire.is_some())
            .field("never_completes", &self.never_completes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{BlockType, Point, TileEditType};

    struct Counter {
        seen: usize,
    }

    impl SwitchHitCallback<()> for Counter {
        fn on_switch_hit(&mut self, _actor: &(), _event: &SwitchHit) -> CallbackResult {
            self.seen += 1;
            Ok(InteractionResult::new(true, self.seen >= 2))
        }
    }

    #[test]
    fn result_constructors() {
        assert_eq!(InteractionResult::handled(), InteractionResult::new(true, false));
        assert_eq!(InteractionResult::completed(), InteractionResult::new(true, true));
        assert_eq!(InteractionResult::not_handled(), InteractionResult::default());
    }

    #[test]
    fn builder_registers_per_kind() {
        let interaction: Interaction<()> = Interaction::new()
            .on_tile_edit(|_, _| Ok(InteractionResult::handled()))
            .switch_hit_handler(Counter { seen: 0 })
            .never_completes();

        assert!(interaction.handles(EventKind::TileEdit));
        assert!(interaction.handles(EventKind::SwitchHit));
        assert!(!interaction.handles(EventKind::SignRead));
        assert!(interaction.never_completes);
        assert!(format!("{:?}", interaction).contains("TileEdit"));
    }

    #[test]
    fn erased_callback_keeps_handler_state() {
        let mut interaction: Interaction<()> =
            Interaction::new().switch_hit_handler(Counter { seen: 0 });
        let callback = interaction.callbacks.get_mut(&EventKind::SwitchHit).unwrap();
        let event: InteractionEvent = SwitchHit {
            location: Point::new(0, 0),
        }
        .into();

        assert_eq!(callback(&(), &event).unwrap(), InteractionResult::handled());
        assert_eq!(callback(&(), &event).unwrap(), InteractionResult::completed());
    }

    #[test]
    fn erased_callback_ignores_mismatched_event() {
        let mut callback = erase_sign_read::<(), _>(FnCallback(|_: &(), _: &SignRead| {
            Ok(InteractionResult::completed())
        }));
        let event: InteractionEvent = TileEdit {
            edit_type: TileEditType::TileKill,
            block_type: BlockType(0),
            location: Point::new(0, 0),
            object_style: 0,
        }
        .into();
        assert_eq!(callback(&(), &event).unwrap(), InteractionResult::not_handled());
    }
}
