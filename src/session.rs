//! The IRC session state machine and message dispatcher.

#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::ircmsg::{ClientMsg, Kind, ServerMsg, Source};
use std::time::{Duration, Instant};

/// How long to wait between reconnect attempts.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(60);

/// The connection phase of the session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// No connection; a reconnect attempt is pending.
    Disconnected,
    /// A connect attempt is in progress.
    Connecting,
    /// Connected; USER/NICK sent, waiting for the welcome reply.
    Registering,
    /// Welcome received; channel joins are being issued.
    Joining,
    /// Fully operational.
    Active,
    /// Terminal; the process is on its way out.
    ShuttingDown,
}

/// What the driver must do after a protocol event, beyond sending replies.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Directive {
    /// Tear down the connection and reconnect after the backoff interval.
    Disconnect,
    /// Clean up and exit the process.
    Die {
        /// True for a commanded shutdown, false for a fatal condition.
        graceful: bool,
    },
    /// Clean up and restart the process with its original arguments.
    Reboot,
}

/// The single IRC session.
///
/// Owns the connection phase and the configured identity, consumes framed
/// lines, and emits outbound messages. It performs no I/O itself; the
/// driver loop in [`run`][crate::run] feeds it and writes whatever it
/// pushes into the outbound queue.
#[derive(Debug)]
pub struct Session {
    nick: String,
    ident: String,
    channels: Vec<String>,
    phase: Phase,
    last_attempt: Option<Instant>,
}

impl Session {
    /// Creates a new disconnected session from the startup configuration.
    pub fn new(config: &Config) -> Session {
        Session {
            nick: config.nick.clone(),
            ident: config.ident.clone(),
            channels: config.channels.clone(),
            phase: Phase::Disconnected,
            last_attempt: None,
        }
    }

    /// The current connection phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The configured channel set, in join order.
    pub fn channels(&self) -> &[String] {
        self.channels.as_slice()
    }

    /// Returns true if a connect attempt should be made now.
    ///
    /// At most one attempt is made per backoff interval; the first attempt
    /// is due immediately.
    pub fn reconnect_due(&self, now: Instant) -> bool {
        self.phase == Phase::Disconnected
            && self
                .last_attempt
                .map_or(true, |at| now.duration_since(at) >= RECONNECT_INTERVAL)
    }

    /// Marks the start of a connect attempt.
    pub fn begin_connect(&mut self, now: Instant) {
        self.phase = Phase::Connecting;
        self.last_attempt = Some(now);
    }

    /// The connect attempt failed; wait out the backoff and try again.
    pub fn connect_failed(&mut self) {
        self.phase = Phase::Disconnected;
    }

    /// The transport is up: emits the registration handshake.
    pub fn on_connected(&mut self, out: &mut Vec<ClientMsg>) {
        tracing::info!(target: "notifyserv::irc", "connected to IRC server");
        let mut user = ClientMsg::new_cmd("USER");
        user.args.add(&self.ident);
        user.args.add("0");
        user.args.add("*");
        user.args.add_long(crate::VERSION_STRING);
        out.push(user);
        let mut nick = ClientMsg::new_cmd("NICK");
        nick.args.add(&self.nick);
        out.push(nick);
        self.phase = Phase::Registering;
    }

    /// The connection was lost outside our control.
    pub fn on_connection_lost(&mut self) {
        if self.phase != Phase::ShuttingDown {
            self.phase = Phase::Disconnected;
        }
    }

    /// Dispatches one framed line.
    ///
    /// Unparseable lines are dropped with a warning; they never fail the
    /// session. Replies go into `out` for the driver to write.
    pub fn on_line(&mut self, line: &str, out: &mut Vec<ClientMsg>) -> Option<Directive> {
        let msg = match ServerMsg::parse(line) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(target: "notifyserv::irc", "ignoring unparseable line ({e}): {line}");
                return None;
            }
        };
        match &msg.kind {
            Kind::Cmd(cmd) => match cmd.as_str() {
                "ERROR" => self.on_error(&msg),
                "PING" => {
                    let mut pong = ClientMsg::new_cmd("PONG");
                    pong.args = msg.args.clone();
                    tracing::debug!(target: "notifyserv::irc", "sending {pong}");
                    out.push(pong);
                    None
                }
                "PRIVMSG" => self.on_privmsg(&msg, out),
                "KICK" => self.on_kick(&msg, out),
                _ => {
                    tracing::trace!(target: "notifyserv::irc", "unhandled {cmd}");
                    None
                }
            },
            Kind::Numeric(1) => self.on_welcome(&msg, out),
            Kind::Numeric(433) => self.on_nick_in_use(&msg, out),
            Kind::Numeric(_) => None,
        }
    }

    fn on_error(&mut self, msg: &ServerMsg) -> Option<Directive> {
        let text = msg.args.split_last().1.map(String::as_str).unwrap_or("");
        if text.contains("Connection timed out") {
            tracing::debug!(target: "notifyserv::irc", "server closed the link: {text}");
        } else {
            tracing::error!(target: "notifyserv::irc", "received error: {text}");
        }
        Some(Directive::Disconnect)
    }

    fn on_welcome(&mut self, msg: &ServerMsg, out: &mut Vec<ClientMsg>) -> Option<Directive> {
        if msg.args.all().first().map(String::as_str) != Some(self.nick.as_str()) {
            return None;
        }
        tracing::info!(target: "notifyserv::irc", "connection complete");
        self.phase = Phase::Joining;
        for channel in &self.channels {
            tracing::info!(target: "notifyserv::irc", "joining {channel}");
            out.push(ClientMsg::join(channel));
        }
        // Joins are optimistic; no confirmations are awaited.
        self.phase = Phase::Active;
        None
    }

    fn on_nick_in_use(&mut self, msg: &ServerMsg, out: &mut Vec<ClientMsg>) -> Option<Directive> {
        if !msg.args.all().iter().any(|word| word == &self.nick) {
            return None;
        }
        tracing::error!(target: "notifyserv::irc", "nickname {} is already in use", self.nick);
        out.push(ClientMsg::quit("Exiting"));
        self.phase = Phase::ShuttingDown;
        Some(Directive::Die { graceful: false })
    }

    fn on_privmsg(&mut self, msg: &ServerMsg, out: &mut Vec<ClientMsg>) -> Option<Directive> {
        let source = msg.source.as_ref()?;
        let args = msg.args.all();
        let target = args.first().map(String::as_str).unwrap_or("");
        // Commands only exist in a channel context; queries and degenerate
        // targets are ignored.
        if !target.starts_with('#') || target.len() < 2 || args.len() < 2 {
            return None;
        }
        let target = target.to_owned();
        let text = msg.args.split_last().1.map(String::as_str).unwrap_or("");
        // A command must start at the first byte of the message text.
        if !text.starts_with('!') {
            return None;
        }
        let command = text.split_whitespace().next().unwrap_or("");
        match command.to_ascii_lowercase().as_str() {
            "!ping" => {
                tracing::debug!(target: "notifyserv::irc", "{} pinged me, sending pong", source.nick);
                out.push(ClientMsg::privmsg(&target, &format!("{}: pong", source.nick)));
            }
            "!version" => {
                tracing::debug!(target: "notifyserv::irc", "{} asked for my version", source.nick);
                out.push(ClientMsg::privmsg(&target, &format!("This is {}", crate::VERSION_STRING)));
            }
            "!die" => {
                tracing::info!(target: "notifyserv::irc", "dying as requested by {} on IRC", identity(source));
                out.push(ClientMsg::quit("Dying"));
                self.phase = Phase::ShuttingDown;
                return Some(Directive::Die { graceful: true });
            }
            "!reboot" => {
                tracing::info!(target: "notifyserv::irc", "rebooting as requested by {} on IRC", identity(source));
                self.phase = Phase::ShuttingDown;
                return Some(Directive::Reboot);
            }
            // Only these four tokens are recognized; this is not an open
            // command interpreter.
            _ => {}
        }
        None
    }

    fn on_kick(&mut self, msg: &ServerMsg, out: &mut Vec<ClientMsg>) -> Option<Directive> {
        let args = msg.args.all();
        let (Some(channel), Some(kicked)) = (args.first(), args.get(1)) else {
            return None;
        };
        if kicked != &self.nick || !self.channels.iter().any(|c| c == channel) {
            return None;
        }
        tracing::info!(target: "notifyserv::irc", "kicked from {channel}, rejoining");
        out.push(ClientMsg::join(channel));
        None
    }
}

fn identity(source: &Source) -> String {
    match (&source.user, &source.host) {
        (Some(user), Some(host)) => format!("{} ({user}@{host})", source.nick),
        _ => source.nick.clone(),
    }
}
