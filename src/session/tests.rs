use super::{Directive, Phase, Session, RECONNECT_INTERVAL};
use crate::config::Config;
use crate::ircmsg::ClientMsg;
use clap::Parser;
use std::time::{Duration, Instant};

fn session() -> Session {
    let config = Config::parse_from([
        "notifyserv",
        "-c",
        "#ops,#alerts",
        "-s",
        "irc.example.org",
        "-n",
        "notify",
    ]);
    Session::new(&config)
}

fn lines(out: &[ClientMsg]) -> Vec<String> {
    out.iter().map(ClientMsg::to_string).collect()
}

#[test]
fn registration_handshake() {
    let mut session = session();
    let mut out = Vec::new();
    session.begin_connect(Instant::now());
    session.on_connected(&mut out);
    assert_eq!(
        lines(&out),
        [format!("USER notify 0 * :{}", crate::VERSION_STRING), "NICK notify".to_owned()]
    );
    assert_eq!(session.phase(), Phase::Registering);
}

#[test]
fn welcome_joins_channels_in_order() {
    let mut session = session();
    let mut out = Vec::new();
    let directive = session.on_line(":server 001 notify :Welcome to the network", &mut out);
    assert_eq!(directive, None);
    assert_eq!(lines(&out), ["JOIN #ops", "JOIN #alerts"]);
    assert_eq!(session.phase(), Phase::Active);
}

#[test]
fn welcome_for_someone_else_is_ignored() {
    let mut session = session();
    let mut out = Vec::new();
    session.on_line(":server 001 other :Welcome to the network", &mut out);
    assert!(out.is_empty());
    assert_ne!(session.phase(), Phase::Active);
}

#[test]
fn ping_gets_pong() {
    let mut session = session();
    let mut out = Vec::new();
    let directive = session.on_line("PING :abc123", &mut out);
    assert_eq!(directive, None);
    assert_eq!(lines(&out), ["PONG :abc123"]);
}

#[test]
fn nick_collision_is_fatal_and_quits() {
    let mut session = session();
    let mut out = Vec::new();
    let directive =
        session.on_line(":server 433 * notify :Nickname is already in use.", &mut out);
    assert_eq!(directive, Some(Directive::Die { graceful: false }));
    assert_eq!(lines(&out), ["QUIT :Exiting"]);
    assert_eq!(session.phase(), Phase::ShuttingDown);
}

#[test]
fn nick_collision_without_trailing_is_fatal() {
    let mut session = session();
    let mut out = Vec::new();
    let directive = session.on_line(":server 433 notify", &mut out);
    assert_eq!(directive, Some(Directive::Die { graceful: false }));
    assert_eq!(lines(&out), ["QUIT :Exiting"]);
}

#[test]
fn nick_collision_for_someone_else_is_ignored() {
    let mut session = session();
    let mut out = Vec::new();
    let directive = session.on_line(":server 433 * other :Nickname is already in use.", &mut out);
    assert_eq!(directive, None);
}

#[test]
fn error_lines_disconnect_but_never_kill() {
    let mut session = session();
    let mut out = Vec::new();
    let soft = session.on_line("ERROR :Closing Link: (Connection timed out)", &mut out);
    assert_eq!(soft, Some(Directive::Disconnect));
    let hard = session.on_line("ERROR :Closing Link: banned", &mut out);
    assert_eq!(hard, Some(Directive::Disconnect));
    assert!(out.is_empty());
}

#[test]
fn ping_command_replies_in_channel() {
    let mut session = session();
    let mut out = Vec::new();
    session.on_line(":alice!a@h PRIVMSG #ops :!ping", &mut out);
    assert_eq!(lines(&out), ["PRIVMSG #ops :alice: pong"]);
}

#[test]
fn ping_command_is_case_insensitive() {
    let mut session = session();
    let mut out = Vec::new();
    session.on_line(":alice!a@h PRIVMSG #ops :!PING", &mut out);
    assert_eq!(lines(&out), ["PRIVMSG #ops :alice: pong"]);
}

#[test]
fn version_command_reports_version() {
    let mut session = session();
    let mut out = Vec::new();
    session.on_line(":bob!b@h PRIVMSG #ops :!version", &mut out);
    assert_eq!(lines(&out), [format!("PRIVMSG #ops :This is {}", crate::VERSION_STRING)]);
}

#[test]
fn die_command_quits() {
    let mut session = session();
    let mut out = Vec::new();
    let directive = session.on_line(":bob!b@h PRIVMSG #ops :!die", &mut out);
    assert_eq!(directive, Some(Directive::Die { graceful: true }));
    assert_eq!(lines(&out), ["QUIT :Dying"]);
    assert_eq!(session.phase(), Phase::ShuttingDown);
}

#[test]
fn reboot_command_restarts() {
    let mut session = session();
    let mut out = Vec::new();
    let directive = session.on_line(":bob!b@h PRIVMSG #ops :!reboot", &mut out);
    assert_eq!(directive, Some(Directive::Reboot));
    assert_eq!(session.phase(), Phase::ShuttingDown);
}

#[test]
fn unknown_commands_and_chatter_are_ignored() {
    let mut session = session();
    let mut out = Vec::new();
    assert_eq!(session.on_line(":a!b@c PRIVMSG #ops :!frobnicate", &mut out), None);
    assert_eq!(session.on_line(":a!b@c PRIVMSG #ops :hello there", &mut out), None);
    assert!(out.is_empty());
}

#[test]
fn commands_must_start_the_message() {
    let mut session = session();
    let mut out = Vec::new();
    assert_eq!(session.on_line(":alice!a@h PRIVMSG #ops : !ping", &mut out), None);
    assert_eq!(session.on_line(":alice!a@h PRIVMSG #ops :say !ping", &mut out), None);
    assert!(out.is_empty());
}

#[test]
fn queries_are_not_command_targets() {
    let mut session = session();
    let mut out = Vec::new();
    session.on_line(":alice!a@h PRIVMSG notify :!ping", &mut out);
    assert!(out.is_empty());
}

#[test]
fn degenerate_channel_tokens_are_ignored() {
    let mut session = session();
    let mut out = Vec::new();
    assert_eq!(session.on_line(":alice!a@h PRIVMSG # :!ping", &mut out), None);
    assert_eq!(session.on_line(":alice!a@h PRIVMSG", &mut out), None);
    assert!(out.is_empty());
}

#[test]
fn kick_triggers_rejoin() {
    let mut session = session();
    let mut out = Vec::new();
    session.on_line(":op!o@h KICK #ops notify :bye", &mut out);
    assert_eq!(lines(&out), ["JOIN #ops"]);
}

#[test]
fn kick_of_someone_else_is_ignored() {
    let mut session = session();
    let mut out = Vec::new();
    session.on_line(":op!o@h KICK #ops alice :bye", &mut out);
    session.on_line(":op!o@h KICK #elsewhere notify :bye", &mut out);
    assert!(out.is_empty());
}

#[test]
fn malformed_lines_never_panic() {
    let mut session = session();
    let mut out = Vec::new();
    for line in ["", "   ", ":", "@", ": PING", "123x", ":nick!u@h"] {
        assert_eq!(session.on_line(line, &mut out), None);
    }
    assert!(out.is_empty());
}

#[test]
fn reconnect_backoff_is_fixed() {
    let mut session = session();
    let t0 = Instant::now();
    assert_eq!(session.phase(), Phase::Disconnected);
    assert!(session.reconnect_due(t0));
    session.begin_connect(t0);
    assert_eq!(session.phase(), Phase::Connecting);
    session.connect_failed();
    assert!(!session.reconnect_due(t0 + RECONNECT_INTERVAL - Duration::from_secs(1)));
    assert!(session.reconnect_due(t0 + RECONNECT_INTERVAL));
}

#[test]
fn lost_connection_reconnects_after_backoff() {
    let mut session = session();
    let mut out = Vec::new();
    let t0 = Instant::now();
    session.begin_connect(t0);
    session.on_connected(&mut out);
    out.clear();
    session.on_line(":server 001 notify :Welcome", &mut out);
    assert_eq!(session.phase(), Phase::Active);
    session.on_connection_lost();
    assert_eq!(session.phase(), Phase::Disconnected);
    assert!(!session.reconnect_due(t0 + Duration::from_secs(30)));
    assert!(session.reconnect_due(t0 + RECONNECT_INTERVAL));
}
