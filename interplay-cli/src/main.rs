#![warn(clippy::all)]
#![allow(clippy::pedantic)]

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use interplay_common::{logging, Config, Validate};
use interplay_core::{Actor, CommandHost, CommandTable, HandlerConfig, InteractionHandler};

mod console;
mod plugin;

use console::ConsoleActor;

/// Interplay console: type commands and world events as a single player.
#[derive(Parser, Debug)]
#[command(name = "interplay")]
#[command(version = "0.1.0")]
#[command(about = "Drive per-player interactive sessions from the terminal.", long_about = None)]
struct Cli {
    /// Config file (default: ~/.interplay/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the session timeout, in ticks
    #[arg(long)]
    timeout_ticks: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,

    /// Player name
    #[arg(long, default_value = "console")]
    name: String,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env_overrides();

    if let Some(ticks) = cli.timeout_ticks {
        config.interaction.timeout_ticks = ticks;
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.observability.log_format = format.clone();
    }

    Validate::validate(&config).context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init_from_config(&config.observability);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("interplay-watcher")
        .enable_time()
        .build()
        .context("failed to start runtime")?;

    let table = Arc::new(CommandTable::new());
    table.add(Arc::new(plugin::host_help(&table)));

    let handler = Arc::new(
        InteractionHandler::builder(table.clone())
            .config(HandlerConfig::from_config(&config.interaction))
            .runtime(runtime.handle().clone())
            .build()?,
    );
    plugin::install(&handler)?;

    let actor = Arc::new(ConsoleActor::new(cli.name));
    info!(player = actor.name(), "Console ready");
    actor.send_info_message("Type /help for commands, 'quit' to exit.");

    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "disconnect" => {
                actor.set_connected(false);
                actor.send_info_message("Marked as disconnected.");
                continue;
            }
            "connect" => {
                actor.set_connected(true);
                continue;
            }
            _ => {}
        }

        if line.starts_with('/') {
            table.execute(&actor, line);
            continue;
        }
        match console::parse_event(line) {
            Ok(Some(event)) => {
                let kind = event.kind();
                let handled = handler.dispatch(&actor, &event);
                if !handled {
                    actor.send_info_message(&format!("{kind} at {} passed through.", event.location()));
                }
            }
            Ok(None) => actor.send_error_message("Unknown input. Try /help."),
            Err(e) => actor.send_error_message(&format!("{e:#}")),
        }
    }

    handler.dispose()?;
    info!("Console closed");
    Ok(())
}
