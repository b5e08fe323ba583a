use std::sync::{Arc, Mutex};

use crate::actor::Actor;
use crate::config::HandlerConfig;
use crate::error::{InteractionError, Result};

use super::help::{HelpBook, HelpOverride};
use super::{Command, CommandHost, HelpCallback};

/// Commands a handler added to the host, plus its help override.
pub(crate) struct CommandRegistry<A> {
    host: Arc<dyn CommandHost<A>>,
    owned: Mutex<Vec<Arc<Command<A>>>>,
    book: Arc<HelpBook<A>>,
    help: Mutex<Option<HelpOverride<A>>>,
}

impl<A: Actor> CommandRegistry<A> {
    /// Take over the host's help command.
    pub(crate) fn new(host: Arc<dyn CommandHost<A>>, config: &HandlerConfig) -> Self {
        let book = Arc::new(HelpBook::new());
        let help = HelpOverride::install(host.as_ref(), Arc::clone(&book), config);
        Self {
            host,
            owned: Mutex::new(Vec::new()),
            book,
            help: Mutex::new(help),
        }
    }

    pub(crate) fn register(
        &self,
        command: Arc<Command<A>>,
        help: Option<HelpCallback<A>>,
    ) -> Result<()> {
        // Held across check and add so concurrent registrations serialize.
        let mut owned = self.owned.lock().unwrap_or_else(|p| p.into_inner());

        if self.host.contains(&command) {
            return Err(InteractionError::CommandAlreadyRegistered {
                name: command.name().to_string(),
            });
        }
        if let Some(name) = command.names().iter().find(|n| self.host.find(n).is_some()) {
            return Err(InteractionError::CommandAlreadyRegistered { name: name.clone() });
        }

        self.host.add(Arc::clone(&command));
        if let Some(help) = help {
            self.book.insert(Arc::clone(&command), help);
        }
        tracing::info!(command = %command.name(), "Registered command");
        owned.push(command);
        Ok(())
    }

    pub(crate) fn deregister(&self, command: &Arc<Command<A>>) -> Result<()> {
        let mut owned = self.owned.lock().unwrap_or_else(|p| p.into_inner());

        if !self.host.remove(command) {
            return Err(InteractionError::CommandNotRegistered {
                name: command.name().to_string(),
            });
        }
        owned.retain(|c| !Arc::ptr_eq(c, command));
        self.book.remove(command);
        tracing::info!(command = %command.name(), "Deregistered command");
        Ok(())
    }

    /// Remove every owned command and restore the help command. Idempotent.
    pub(crate) fn teardown(&self) {
        let owned = std::mem::take(&mut *self.owned.lock().unwrap_or_else(|p| p.into_inner()));
        for command in &owned {
            self.host.remove(command);
        }
        self.book.clear();

        let help = self.help.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(help) = help {
            help.restore(self.host.as_ref());
        }
        if !owned.is_empty() {
            tracing::debug!(count = owned.len(), "Removed handler commands");
        }
    }

    pub(crate) fn help_overridden(&self) -> bool {
        self.help.lock().unwrap_or_else(|p| p.into_inner()).is_some()
    }
}
