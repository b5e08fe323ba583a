//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use interplay_core::{Actor, ActorId, Command, CommandTable, InteractionHandler};

/// Actor that records every message it is sent.
pub struct TestActor {
    id: ActorId,
    name: String,
    connected: AtomicBool,
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl TestActor {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id: ActorId(id),
            name: format!("player{id}"),
            connected: AtomicBool::new(true),
            infos: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        })
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Actor for TestActor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send_info_message(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn send_error_message(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Thread-safe call counter for callbacks.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Parameter lists the host's original help command was invoked with.
pub type HelpCalls = Arc<Mutex<Vec<Vec<String>>>>;

/// Host command table holding only a recording `help` command.
pub fn host_with_help() -> (Arc<CommandTable<TestActor>>, HelpCalls) {
    let calls: HelpCalls = Arc::default();
    let recorded = Arc::clone(&calls);
    let help = Command::new(["help"], move |args| {
        recorded.lock().unwrap().push(args.parameters.clone());
        Ok(())
    })
    .with_help_text("Lists commands or gives help on them.");
    (Arc::new(CommandTable::with_commands([help])), calls)
}

/// Handler on the current runtime with default settings.
pub fn handler() -> (InteractionHandler<TestActor>, Arc<CommandTable<TestActor>>, HelpCalls) {
    let (host, calls) = host_with_help();
    let handler = InteractionHandler::new(host.clone()).expect("handler");
    (handler, host, calls)
}
