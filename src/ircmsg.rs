//! Minimally-processed IRC messages.

mod args;
pub mod codec;
mod source;

pub use self::{args::*, source::*};

use crate::error::ParseError;

/// What kind of message this is, either a word command or a numeric reply.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    /// A word command such as `PRIVMSG`, normalized to uppercase.
    Cmd(String),
    /// A three-digit numeric reply code.
    Numeric(u16),
}

impl Kind {
    /// Parses a message kind from one whitespace-delimited word.
    pub fn from_word(word: &str) -> Result<Kind, ParseError> {
        if word.is_empty() {
            return Err(ParseError::Empty);
        }
        if word.len() == 3 && word.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Kind::Numeric(word.parse().unwrap_or_default()));
        }
        if !word.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(ParseError::InvalidKind);
        }
        Ok(Kind::Cmd(word.to_ascii_uppercase()))
    }
}

impl PartialEq<&str> for Kind {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Kind::Cmd(cmd) if cmd == other)
    }
}

impl PartialEq<u16> for Kind {
    fn eq(&self, other: &u16) -> bool {
        matches!(self, Kind::Numeric(num) if num == other)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Cmd(cmd) => write!(f, "{cmd}"),
            Kind::Numeric(num) => write!(f, "{num:03}"),
        }
    }
}

/// An IRC message as relayed by a server.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ServerMsg {
    /// Where this message originated, if a prefix was present.
    pub source: Option<Source>,
    /// What kind of message this is.
    pub kind: Kind,
    /// This message's arguments.
    pub args: Args,
}

impl ServerMsg {
    /// Parses a message from one framed line, terminators already stripped.
    ///
    /// The grammar is `[@tags] [:prefix] COMMAND param* [:trailing]`.
    /// Tags are never requested, so their content is discarded if a server
    /// sends them anyway.
    pub fn parse(line: &str) -> Result<ServerMsg, ParseError> {
        let mut rest = line.trim_start_matches(' ');
        if let Some(tagged) = rest.strip_prefix('@') {
            rest = match tagged.split_once(' ') {
                Some((_, r)) => r.trim_start_matches(' '),
                None => "",
            };
        }
        let mut source = None;
        if let Some(prefixed) = rest.strip_prefix(':') {
            let (word, r) = prefixed.split_once(' ').ok_or(ParseError::NoSource)?;
            if word.is_empty() {
                return Err(ParseError::NoSource);
            }
            source = Some(Source::parse(word));
            rest = r.trim_start_matches(' ');
        }
        let (kind, rest) = match rest.split_once(' ') {
            Some((word, r)) => (word, r),
            None => (rest, ""),
        };
        let kind = Kind::from_word(kind)?;
        let args = Args::parse(rest);
        Ok(ServerMsg { source, kind, args })
    }
}

/// An IRC message to be sent by this client.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ClientMsg {
    /// This message's command.
    pub cmd: &'static str,
    /// This message's arguments.
    pub args: Args,
}

impl ClientMsg {
    /// Creates a new `ClientMsg` with the provided command and no arguments.
    pub const fn new_cmd(cmd: &'static str) -> Self {
        ClientMsg { cmd, args: Args::new() }
    }
    /// Creates a `PRIVMSG` to the provided target.
    pub fn privmsg(target: &str, text: &str) -> Self {
        let mut msg = ClientMsg::new_cmd("PRIVMSG");
        msg.args.add(target);
        msg.args.add_long(text);
        msg
    }
    /// Creates a `JOIN` for the provided channel.
    pub fn join(channel: &str) -> Self {
        let mut msg = ClientMsg::new_cmd("JOIN");
        msg.args.add(channel);
        msg
    }
    /// Creates a `QUIT` with the provided reason.
    pub fn quit(reason: &str) -> Self {
        let mut msg = ClientMsg::new_cmd("QUIT");
        msg.args.add_long(reason);
        msg
    }
}

impl std::fmt::Display for ClientMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cmd)?;
        if !self.args.is_empty() {
            write!(f, " {}", self.args)?;
        }
        Ok(())
    }
}
