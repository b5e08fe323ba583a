use std::sync::{Arc, RwLock};

use crate::actor::Actor;

use super::{Command, CommandArgs, CommandHost};

/// In-process command table with a `/`-prefixed text front end.
///
/// Hosts that already keep their own command list implement [`CommandHost`]
/// directly; this type covers everyone else and the test suites.
pub struct CommandTable<A> {
    commands: RwLock<Vec<Arc<Command<A>>>>,
}

impl<A: Actor> CommandTable<A> {
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
        }
    }

    pub fn with_commands(commands: impl IntoIterator<Item = Command<A>>) -> Self {
        let table = Self::new();
        for command in commands {
            table.add(Arc::new(command));
        }
        table
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Parse and run a chat line such as `/help warp`.
    ///
    /// Returns `false` if the text names no command. Command failures are
    /// logged and reported to the actor; they still count as executed.
    pub fn execute(&self, actor: &Arc<A>, text: &str) -> bool {
        let text = text.trim();
        let text = text.strip_prefix('/').unwrap_or(text);
        let mut parameters = parse_parameters(text);
        if parameters.is_empty() {
            return false;
        }
        let name = parameters.remove(0);

        // Resolve first so the table lock is released before the command
        // runs; commands are free to register further commands.
        let Some(command) = self.find(&name) else {
            actor.send_error_message(&format!(
                "Invalid command entered. Type /help for a list of valid commands. ({name})"
            ));
            return false;
        };

        let args = CommandArgs::new(Arc::clone(actor), text, parameters);
        if let Err(e) = command.run(&args) {
            tracing::error!(
                command = %command.name(),
                actor = %actor.id(),
                error = %e,
                "Command failed"
            );
            actor.send_error_message("Command failed, check logs for more details.");
        }
        true
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<Command<A>>>> {
        self.commands.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<A: Actor> Default for CommandTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Actor> CommandHost<A> for CommandTable<A> {
    fn commands(&self) -> Vec<Arc<Command<A>>> {
        self.read().clone()
    }

    fn add(&self, command: Arc<Command<A>>) {
        self.commands
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(command);
    }

    fn remove(&self, command: &Arc<Command<A>>) -> bool {
        let mut commands = self
            .commands
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = commands.len();
        commands.retain(|c| !Arc::ptr_eq(c, command));
        commands.len() != before
    }

    fn find(&self, name: &str) -> Option<Arc<Command<A>>> {
        self.read().iter().find(|c| c.has_name(name)).cloned()
    }
}

/// Split command text into words.
///
/// Double quotes group words, and a backslash escapes the next character.
pub fn parse_parameters(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    out.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || quoted {
        out.push(current);
    }
    out
}
