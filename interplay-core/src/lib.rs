//! Interplay Core - Per-actor interactive sessions for game-server plugins.
//!
//! A plugin command such as "/protect" often needs a follow-up world action
//! from the same player ("now hit the block you want protected"). This crate
//! keeps one pending interaction per actor and routes the host's events to it:
//!
//! - Tile edits, container opens, sign edits and reads, switch hits
//! - Completion on demand, or sliding expiry after a configurable timeout
//! - Command registration with per-command help, through an overridden
//!   `/help` command
//!
//! ## Architecture
//!
//! ```text
//! host event ─→ InteractionHandler::dispatch ─→ Session callback
//!                        │                            │
//!              SessionRegistry (one mutex) ←── handled / completed
//!                        ↑
//!              per-session watcher task (tokio) ─→ on_expire
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod actor;
pub mod command;
pub mod config;
mod dispatch;
pub mod error;
pub mod event;
mod guard;
pub mod handler;
pub mod interaction;
mod registry;
pub mod session;
mod watcher;

// Re-export commonly used types
pub use actor::{Actor, ActorId};
pub use command::{Command, CommandArgs, CommandCallback, CommandHost, CommandTable, HelpCallback};
pub use config::HandlerConfig;
pub use error::{InteractionError, Result};
pub use event::{
    BlockType, ContainerOpen, EventKind, InteractionEvent, Point, SignEdit, SignRead, SwitchHit,
    TileEdit, TileEditType,
};
pub use handler::{InteractionHandler, InteractionHandlerBuilder, LifecycleState};
pub use interaction::{
    CallbackResult, ContainerOpenCallback, Interaction, InteractionResult, SignEditCallback,
    SignReadCallback, SwitchHitCallback, TileEditCallback,
};
pub use session::{SessionHandle, SessionId};
