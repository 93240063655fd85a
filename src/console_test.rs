use super::*;
use crate::config::WidgetConfig;

#[test]
fn parse_dispatch_with_defaults() {
    let command = parse_command(r#"dispatchMessage {"userId":"u1","messageId":"m1","text":"hi"}"#).unwrap();
    assert_eq!(
        command,
        Command::Dispatch(Message {
            user_id: "u1".into(),
            message_id: "m1".into(),
            color: String::new(),
            name: String::new(),
            text: MessageText::Plain("hi".into()),
        })
    );
}

#[test]
fn parse_dispatch_rejects_bad_json() {
    assert!(matches!(parse_command("dispatchMessage {nope"), Err(EventError::InvalidJson(_))));
    assert!(matches!(parse_command("dispatchMessage"), Err(EventError::InvalidJson(_))));
}

#[test]
fn parse_delete_and_purge() {
    assert_eq!(parse_command("deleteMessage m1").unwrap(), Command::Delete("m1".into()));
    assert_eq!(parse_command("  purgeUser   u1  ").unwrap(), Command::Purge("u1".into()));
    assert!(matches!(parse_command("deleteMessage"), Err(EventError::MissingField("messageId"))));
    assert!(matches!(parse_command("purgeUser "), Err(EventError::MissingField("userId"))));
}

#[test]
fn parse_unknown_verb() {
    let err = parse_command("launchRocket now").unwrap_err();
    assert!(matches!(err, EventError::UnknownCommand(ref verb) if verb == "launchRocket"));
}

#[test]
fn run_invokes_manager_operations() {
    let mut manager = BubbleManager::new(&WidgetConfig::default());

    for line in [
        r#"dispatchMessage {"userId":"u1","messageId":"m1","text":"a"}"#,
        r#"dispatchMessage {"userId":"u1","messageId":"m2","text":"b"}"#,
        r#"dispatchMessage {"userId":"u2","messageId":"m3","text":"c"}"#,
    ] {
        run(&mut manager, parse_command(line).unwrap());
    }
    assert_eq!(manager.surface().len(), 3);

    run(&mut manager, Command::Delete("m3".into()));
    assert_eq!(manager.surface().len(), 2);

    run(&mut manager, Command::Purge("u1".into()));
    assert!(manager.surface().is_empty());
}
