//! Host command integration.
//!
//! The host owns a command table ([`CommandHost`]). The interaction handler
//! adds its own commands to it, remembers per-command help callbacks, and
//! swaps the host's help command for one that consults those callbacks.

mod help;
mod registry;
mod table;

pub(crate) use registry::CommandRegistry;
pub use table::{parse_parameters, CommandTable};

use std::fmt;
use std::sync::Arc;

/// Invocation context passed to command and help callbacks.
pub struct CommandArgs<A> {
    pub actor: Arc<A>,
    /// Raw command text without the leading prefix.
    pub message: String,
    /// Parameters after the command name.
    pub parameters: Vec<String>,
}

impl<A> CommandArgs<A> {
    pub fn new(actor: Arc<A>, message: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            actor,
            message: message.into(),
            parameters,
        }
    }
}

/// Execution delegate of a command.
pub type CommandCallback<A> =
    Arc<dyn Fn(&CommandArgs<A>) -> anyhow::Result<()> + Send + Sync + 'static>;

/// Per-command help delegate, invoked for `/help <command>`.
pub type HelpCallback<A> = CommandCallback<A>;

/// A named command with optional aliases.
///
/// Identity is by allocation: two `Arc<Command>` are the same command only
/// if they point to the same value.
pub struct Command<A> {
    names: Vec<String>,
    callback: CommandCallback<A>,
    help_text: Option<String>,
}

impl<A: 'static> Command<A> {
    /// Create a command. The first name is the primary one; all names are
    /// matched case-insensitively.
    pub fn new<I, S, F>(names: I, callback: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&CommandArgs<A>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            names: names.into_iter().map(|n| n.into().to_lowercase()).collect(),
            callback: Arc::new(callback),
            help_text: None,
        }
    }

    pub fn with_help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }
}

impl<A> Command<A> {
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn run(&self, args: &CommandArgs<A>) -> anyhow::Result<()> {
        (self.callback)(args)
    }
}

impl<A> fmt::Debug for Command<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("names", &self.names)
            .field("help_text", &self.help_text)
            .finish()
    }
}

/// The host's command table.
pub trait CommandHost<A>: Send + Sync {
    /// Snapshot of the registered commands.
    fn commands(&self) -> Vec<Arc<Command<A>>>;

    fn add(&self, command: Arc<Command<A>>);

    /// Remove by identity. Returns whether the command was present.
    fn remove(&self, command: &Arc<Command<A>>) -> bool;

    /// Resolve a command by any of its names.
    fn find(&self, name: &str) -> Option<Arc<Command<A>>> {
        self.commands().into_iter().find(|c| c.has_name(name))
    }

    fn contains(&self, command: &Arc<Command<A>>) -> bool {
        self.commands().iter().any(|c| Arc::ptr_eq(c, command))
    }
}
