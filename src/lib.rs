//! An IRC notification relay daemon.
//!
//! `notifyserv` keeps one connection to an IRC server, joins a fixed set of
//! channels, answers a few in-channel commands, and forwards any line of
//! text received on its local listener sockets to those channels as
//! `PRIVMSG`s. Other local processes get to push notifications into IRC
//! without speaking the protocol themselves.
#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]
#![deny(clippy::redundant_else)]
#![deny(clippy::semicolon_if_nothing_returned)]

pub mod config;
pub mod conn;
pub mod error;
pub mod ircmsg;
pub mod relay;
pub mod run;
pub mod session;

/// The product and version string, as sent on registration and in the
/// `!version` reply.
pub const VERSION_STRING: &str = concat!("notifyserv ", env!("CARGO_PKG_VERSION"));
