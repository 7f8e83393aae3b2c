//! Forwarding listener input to IRC channels.


use crate::ircmsg::ClientMsg;

/// Where one line of listener input is headed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Route<'a> {
    /// Send to every configured channel, in configured order.
    Broadcast(&'a str),
    /// Send to one explicitly named channel.
    Directed {
        /// The target channel, including the leading `#`.
        channel: &'a str,
        /// The message text after the channel token.
        text: &'a str,
    },
}

impl<'a> Route<'a> {
    /// Determines the routing of one line of listener input.
    ///
    /// A line starting with `#<channel> ` goes to that channel only;
    /// everything else, including a bare `#` with no channel name or no
    /// payload after the token, is broadcast as-is.
    pub fn parse(line: &'a str) -> Route<'a> {
        if let Some((channel, text)) = line.split_once(' ') {
            if channel.starts_with('#') && channel.len() >= 2 {
                return Route::Directed { channel, text };
            }
        }
        Route::Broadcast(line)
    }
}

/// Builds the outbound messages for one chunk of listener input.
///
/// A single listener write may carry several newline-separated lines; each
/// is routed and logged on its own. Delivery is best effort: the caller
/// drops whatever it cannot write.
pub fn relay(raw: &str, channels: &[String], origin: &str) -> Vec<ClientMsg> {
    let mut out = Vec::new();
    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        match Route::parse(line) {
            Route::Directed { channel, text } => {
                tracing::info!(
                    target: "notifyserv::relay",
                    "forwarded data from {origin} socket to {channel}: {text}"
                );
                out.push(ClientMsg::privmsg(channel, text));
            }
            Route::Broadcast(text) => {
                for channel in channels {
                    out.push(ClientMsg::privmsg(channel, text));
                }
                tracing::info!(
                    target: "notifyserv::relay",
                    "forwarded data from {origin} socket to all channels: {text}"
                );
            }
        }
    }
    out
}
