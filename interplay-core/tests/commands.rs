//! Integration tests for command registration and the help override.

mod common;

use std::sync::Arc;

use common::{handler, host_with_help, Counter, TestActor};
use interplay_core::{
    Actor, Command, CommandArgs, CommandHost, CommandTable, Interaction, InteractionError,
    InteractionHandler,
};

const NO_HELP: &str = "There is no help for this command available.";

fn counting_command(names: &[&str], counter: &Counter) -> Arc<Command<TestActor>> {
    let counter = counter.clone();
    Arc::new(Command::new(names.iter().copied(), move |_| {
        counter.hit();
        Ok(())
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Help override
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn help_is_overridden_with_alias() {
    let (host, _) = host_with_help();
    let original = host.find("help").unwrap();
    let handler = InteractionHandler::new(host.clone()).unwrap();

    let current = host.find("help").unwrap();
    assert!(!Arc::ptr_eq(&original, &current));
    assert!(current.has_name("cmds"));
    assert_eq!(current.help_text(), original.help_text());
    assert_eq!(host.len(), 1);

    handler.dispose().unwrap();
    let restored = host.find("help").unwrap();
    assert!(Arc::ptr_eq(&original, &restored));
    assert!(host.find("cmds").is_none());
}

#[tokio::test]
async fn help_for_registered_command_uses_its_callback() {
    let (handler, host, calls) = handler();
    let actor = TestActor::new(1);
    let warp = counting_command(&["warp"], &Counter::default());
    handler
        .register_command_with_help(warp, |args: &CommandArgs<TestActor>| {
            args.actor.send_info_message("Usage: /warp <name>");
            Ok(())
        })
        .unwrap();

    assert!(host.execute(&actor, "/help warp"));
    assert!(host.execute(&actor, "/cmds WARP"));
    assert!(host.execute(&actor, "/help /warp"));
    assert_eq!(actor.infos(), vec!["Usage: /warp <name>"; 3]);
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn other_help_requests_reach_original_help() {
    let (handler, host, calls) = handler();
    let actor = TestActor::new(1);
    handler
        .register_command_with_help(counting_command(&["warp"], &Counter::default()), |_| Ok(()))
        .unwrap();

    host.execute(&actor, "/help");
    host.execute(&actor, "/help 2");
    host.execute(&actor, "/help tp");
    host.execute(&actor, "/cmds");

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            Vec::<String>::new(),
            vec!["2".to_string()],
            vec!["tp".to_string()],
            Vec::new(),
        ]
    );
}

#[tokio::test]
async fn failing_help_callback_reports_no_help() {
    let (handler, host, _) = handler();
    let actor = TestActor::new(1);
    let ran = Counter::default();
    handler
        .register_command_with_help(counting_command(&["warp"], &ran), |_| {
            anyhow::bail!("help text missing")
        })
        .unwrap();
    handler
        .register_command_with_help(counting_command(&["home"], &ran), |_| panic!("bad help"))
        .unwrap();

    assert!(host.execute(&actor, "/help warp"));
    assert!(host.execute(&actor, "/help home"));
    assert_eq!(actor.errors(), vec![NO_HELP.to_string(), NO_HELP.to_string()]);

    // Command processing carries on.
    assert!(host.execute(&actor, "/warp spawn"));
    assert_eq!(ran.get(), 1);
}

#[tokio::test]
async fn help_callback_may_use_handler() {
    let (handler, host, _) = handler();
    let handler = Arc::new(handler);
    let actor = TestActor::new(1);

    let inner = Arc::clone(&handler);
    handler
        .register_command_with_help(
            counting_command(&["protect"], &Counter::default()),
            move |args: &CommandArgs<TestActor>| {
                inner.start_or_reset(Arc::clone(&args.actor), Interaction::new())?;
                Ok(())
            },
        )
        .unwrap();

    assert!(host.execute(&actor, "/help protect"));
    assert!(handler.is_active(actor.id()));
    assert!(actor.errors().is_empty());
    handler.dispose().unwrap();
}

#[tokio::test]
async fn host_without_help_command_is_left_alone() {
    let host: Arc<CommandTable<TestActor>> = Arc::new(CommandTable::new());
    let handler = InteractionHandler::new(host.clone()).unwrap();
    assert!(host.is_empty());

    handler
        .register_command(counting_command(&["warp"], &Counter::default()))
        .unwrap();
    assert_eq!(host.len(), 1);

    handler.dispose().unwrap();
    assert!(host.is_empty());
}

#[tokio::test]
async fn existing_alias_is_not_shadowed() {
    let (host, _) = host_with_help();
    let cmds = Counter::default();
    let existing = counting_command(&["cmds"], &cmds);
    host.add(existing.clone());

    let handler = InteractionHandler::new(host.clone()).unwrap();
    let actor = TestActor::new(1);
    assert!(!host.find("help").unwrap().has_name("cmds"));
    assert!(host.execute(&actor, "/cmds"));
    assert_eq!(cmds.get(), 1);
    handler.dispose().unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registered_command_runs_through_host() {
    let (handler, host, _) = handler();
    let actor = TestActor::new(1);
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);
    let command = Arc::new(Command::new(["region"], move |args: &CommandArgs<TestActor>| {
        recorded.lock().unwrap().extend(args.parameters.iter().cloned());
        Ok(())
    }));
    handler.register_command(command).unwrap();

    assert!(host.execute(&actor, r#"/region define "spawn area""#));
    assert_eq!(*seen.lock().unwrap(), vec!["define", "spawn area"]);
}

#[tokio::test]
async fn name_collisions_are_rejected() {
    let (handler, host, _) = handler();
    let counter = Counter::default();
    let warp = counting_command(&["warp", "w"], &counter);
    handler.register_command(warp.clone()).unwrap();

    let again = handler.register_command(warp);
    assert!(matches!(again, Err(InteractionError::CommandAlreadyRegistered { .. })));

    let alias_clash = handler.register_command(counting_command(&["teleport", "W"], &counter));
    match alias_clash {
        Err(InteractionError::CommandAlreadyRegistered { name }) => assert_eq!(name, "w"),
        other => panic!("unexpected result: {other:?}"),
    }

    let help_clash = handler.register_command(counting_command(&["help"], &counter));
    assert!(help_clash.is_err());
    assert_eq!(host.len(), 2);
}

#[tokio::test]
async fn deregister_removes_command_and_help() {
    let (handler, host, calls) = handler();
    let actor = TestActor::new(1);
    let warp = counting_command(&["warp"], &Counter::default());
    handler
        .register_command_with_help(warp.clone(), |args: &CommandArgs<TestActor>| {
            args.actor.send_info_message("warp help");
            Ok(())
        })
        .unwrap();

    handler.deregister_command(&warp).unwrap();
    assert!(host.find("warp").is_none());

    host.execute(&actor, "/help warp");
    assert!(actor.infos().is_empty());
    assert_eq!(calls.lock().unwrap().len(), 1);

    let again = handler.deregister_command(&warp);
    assert!(matches!(again, Err(InteractionError::CommandNotRegistered { .. })));
}

#[tokio::test]
async fn unknown_command_is_reported() {
    let (_handler, host, _) = handler();
    let actor = TestActor::new(1);
    assert!(!host.execute(&actor, "/nonsense"));
    assert_eq!(actor.errors().len(), 1);
}

#[tokio::test]
async fn failing_command_is_reported_to_actor() {
    let (handler, host, _) = handler();
    let actor = TestActor::new(1);
    handler
        .register_command(Arc::new(Command::new(["boom"], |_| anyhow::bail!("broken"))))
        .unwrap();

    assert!(host.execute(&actor, "/boom"));
    assert_eq!(actor.errors(), vec!["Command failed, check logs for more details."]);
}

#[tokio::test]
async fn dispose_removes_owned_commands_only() {
    let (host, _) = host_with_help();
    let foreign = counting_command(&["spawn"], &Counter::default());
    host.add(foreign.clone());

    let handler = InteractionHandler::new(host.clone()).unwrap();
    let warp = counting_command(&["warp"], &Counter::default());
    handler.register_command(warp.clone()).unwrap();
    assert_eq!(host.len(), 3);

    handler.dispose().unwrap();
    assert!(!host.contains(&warp));
    assert!(host.contains(&foreign));
    assert_eq!(host.len(), 2);

    assert!(matches!(
        handler.register_command(warp),
        Err(InteractionError::Disposed)
    ));
}

#[tokio::test]
async fn dropping_handler_restores_host() {
    let (host, _) = host_with_help();
    let original = host.find("help").unwrap();
    {
        let handler = InteractionHandler::new(host.clone()).unwrap();
        handler
            .register_command(counting_command(&["warp"], &Counter::default()))
            .unwrap();
    }
    assert!(Arc::ptr_eq(&host.find("help").unwrap(), &original));
    assert!(host.find("warp").is_none());
}
