//! Help command override.
//!
//! While a handler is alive the host's help command is replaced by one that
//! answers `/help <name>` for the handler's own commands and forwards
//! everything else to the original.

use std::sync::{Arc, RwLock};

use crate::actor::Actor;
use crate::config::HandlerConfig;
use crate::guard;

use super::{Command, CommandArgs, CommandHost, HelpCallback};

/// Help callbacks of registered commands.
pub(crate) struct HelpBook<A> {
    entries: RwLock<Vec<(Arc<Command<A>>, HelpCallback<A>)>>,
}

impl<A> HelpBook<A> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn insert(&self, command: Arc<Command<A>>, callback: HelpCallback<A>) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.retain(|(c, _)| !Arc::ptr_eq(c, &command));
        entries.push((command, callback));
    }

    pub(crate) fn remove(&self, command: &Arc<Command<A>>) {
        self.entries
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .retain(|(c, _)| !Arc::ptr_eq(c, command));
    }

    pub(crate) fn clear(&self) {
        self.entries.write().unwrap_or_else(|p| p.into_inner()).clear();
    }

    /// Help callback of the command answering to `name`.
    pub(crate) fn lookup(&self, name: &str) -> Option<HelpCallback<A>> {
        self.entries
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .find(|(c, _)| c.has_name(name))
            .map(|(_, cb)| Arc::clone(cb))
    }
}

/// An installed help override and what it replaced.
pub(crate) struct HelpOverride<A> {
    original: Arc<Command<A>>,
    custom: Arc<Command<A>>,
}

impl<A: Actor> HelpOverride<A> {
    /// Replace the host's help command. Returns `None` and leaves the host
    /// untouched when it has no help command.
    pub(crate) fn install(
        host: &dyn CommandHost<A>,
        book: Arc<HelpBook<A>>,
        config: &HandlerConfig,
    ) -> Option<Self> {
        let Some(original) = host.find(&config.help_command) else {
            tracing::error!(
                command = %config.help_command,
                "Failed to override the help command: host has no such command"
            );
            return None;
        };

        let mut names = original.names().to_vec();
        for alias in &config.help_aliases {
            if !names.contains(alias) && host.find(alias).is_none() {
                names.push(alias.clone());
            }
        }

        let fallback = Arc::clone(&original);
        let no_help = config.no_help_message.clone();
        let mut custom = Command::new(names, move |args: &CommandArgs<A>| {
            run_help(&book, &fallback, &no_help, args)
        });
        if let Some(text) = original.help_text() {
            custom = custom.with_help_text(text);
        }
        let custom = Arc::new(custom);

        host.remove(&original);
        host.add(Arc::clone(&custom));
        tracing::debug!(names = ?custom.names(), "Help command overridden");

        Some(Self { original, custom })
    }

    /// Put the original help command back, unless someone else already
    /// replaced the override.
    pub(crate) fn restore(self, host: &dyn CommandHost<A>) {
        if host.remove(&self.custom) {
            host.add(self.original);
            tracing::debug!("Help command restored");
        } else {
            tracing::warn!("Help override was removed by someone else, not restoring");
        }
    }
}

fn run_help<A: Actor>(
    book: &HelpBook<A>,
    original: &Command<A>,
    no_help_message: &str,
    args: &CommandArgs<A>,
) -> anyhow::Result<()> {
    let Some(first) = args.parameters.first() else {
        return original.run(args);
    };
    // `/help 2` is a page of the command list.
    if first.parse::<i64>().is_ok() {
        return original.run(args);
    }

    let name = first.trim_start_matches('/').to_lowercase();
    let Some(callback) = book.lookup(&name) else {
        return original.run(args);
    };

    if let Err(e) = guard::contain(|| callback(args)) {
        tracing::error!(
            command = %name,
            actor = %args.actor.id(),
            error = %e,
            "Help callback failed"
        );
        args.actor.send_error_message(no_help_message);
    }
    Ok(())
}
