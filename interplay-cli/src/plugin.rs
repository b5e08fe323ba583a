//! Sample plugin commands driving the interaction handler.

use std::sync::{Arc, Weak};

use anyhow::{Context, Result};
use interplay_core::{
    Actor, Command, CommandArgs, CommandHost, CommandTable, Interaction, InteractionHandler,
    InteractionResult,
};

use crate::console::ConsoleActor;

pub type Handler = InteractionHandler<ConsoleActor>;

const COMMANDS_PER_PAGE: usize = 5;

/// The host's stock help: a paged command list, or a command's help text.
pub fn host_help(table: &Arc<CommandTable<ConsoleActor>>) -> Command<ConsoleActor> {
    let table = Arc::downgrade(table);
    Command::new(["help"], move |args: &CommandArgs<ConsoleActor>| {
        let table = table.upgrade().context("command table is gone")?;

        if let Some(name) = args.parameters.first().filter(|p| p.parse::<usize>().is_err()) {
            match table.find(name.trim_start_matches('/')) {
                Some(command) => args
                    .actor
                    .send_info_message(command.help_text().unwrap_or("No help available.")),
                None => args.actor.send_error_message("Invalid command."),
            }
            return Ok(());
        }

        let mut names: Vec<String> = table.commands().iter().map(|c| c.name().to_string()).collect();
        names.sort();
        let pages = names.len().div_ceil(COMMANDS_PER_PAGE).max(1);
        let page = args
            .parameters
            .first()
            .and_then(|p| p.parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, pages);
        let start = (page - 1) * COMMANDS_PER_PAGE;
        let listed: Vec<String> = names
            .iter()
            .skip(start)
            .take(COMMANDS_PER_PAGE)
            .map(|n| format!("/{n}"))
            .collect();
        args.actor
            .send_info_message(&format!("Commands ({page}/{pages}): {}", listed.join(", ")));
        Ok(())
    })
    .with_help_text("Lists commands or gives help on them. Usage: /help [page|command]")
}

/// Register the sample commands on `handler`.
pub fn install(handler: &Arc<Handler>) -> Result<()> {
    let weak = Arc::downgrade(handler);

    handler.register_command_with_help(
        Arc::new(Command::new(["select", "sel"], select(weak.clone()))),
        |args: &CommandArgs<ConsoleActor>| {
            args.actor
                .send_info_message("/select: place or break a tile to report its position.");
            Ok(())
        },
    )?;
    handler.register_command_with_help(
        Arc::new(Command::new(["inspect"], inspect(weak.clone()))),
        |args: &CommandArgs<ConsoleActor>| {
            args.actor.send_info_message(
                "/inspect: report chests, signs, and switches you touch until /cancel. Sign edits are blocked.",
            );
            Ok(())
        },
    )?;
    handler.register_command(Arc::new(Command::new(["cancel"], cancel(weak))))?;
    Ok(())
}

fn upgrade(handler: &Weak<Handler>) -> Result<Arc<Handler>> {
    handler.upgrade().context("interaction handler is gone")
}

fn select(handler: Weak<Handler>) -> impl Fn(&CommandArgs<ConsoleActor>) -> Result<()> + Send + Sync {
    move |args| {
        let handler = upgrade(&handler)?;
        let interaction = Interaction::new()
            .on_tile_edit(|actor: &ConsoleActor, edit| {
                let verb = if edit.edit_type.is_placement() { "Placed" } else { "Broke" };
                actor.send_info_message(&format!("{verb} a tile at {}.", edit.location));
                Ok(InteractionResult::completed())
            })
            .on_expire(|actor: &ConsoleActor| {
                actor.send_error_message("You did not select a tile in time.");
                Ok(())
            });
        handler.start_or_reset(Arc::clone(&args.actor), interaction)?;

        let seconds = handler.config().timeout().as_secs();
        args.actor
            .send_info_message(&format!("Place or break a tile within {seconds} seconds."));
        Ok(())
    }
}

fn inspect(handler: Weak<Handler>) -> impl Fn(&CommandArgs<ConsoleActor>) -> Result<()> + Send + Sync {
    move |args| {
        let handler = upgrade(&handler)?;
        let interaction = Interaction::new()
            .never_completes()
            .on_container_open(|actor: &ConsoleActor, open| {
                actor.send_info_message(&format!("Chest at {}.", open.location));
                Ok(InteractionResult::handled())
            })
            .on_sign_read(|actor: &ConsoleActor, read| {
                actor.send_info_message(&format!("Sign at {}.", read.location));
                Ok(InteractionResult::handled())
            })
            .on_sign_edit(|actor: &ConsoleActor, edit| {
                actor.send_error_message(&format!(
                    "Sign #{} at {} is read-only while inspecting.",
                    edit.sign_index, edit.location
                ));
                Ok(InteractionResult::handled())
            })
            .on_switch_hit(|actor: &ConsoleActor, hit| {
                actor.send_info_message(&format!("Switch at {}.", hit.location));
                Ok(InteractionResult::handled())
            })
            .on_expire(|actor: &ConsoleActor| {
                actor.send_info_message("Stopped inspecting.");
                Ok(())
            });
        handler.start_or_reset(Arc::clone(&args.actor), interaction)?;
        args.actor.send_info_message("Inspecting. Type /cancel to stop.");
        Ok(())
    }
}

fn cancel(handler: Weak<Handler>) -> impl Fn(&CommandArgs<ConsoleActor>) -> Result<()> + Send + Sync {
    move |args| {
        let handler = upgrade(&handler)?;
        if handler.stop(args.actor.id())? {
            args.actor.send_info_message("Interaction cancelled.");
        } else {
            args.actor.send_error_message("Nothing to cancel.");
        }
        Ok(())
    }
}
