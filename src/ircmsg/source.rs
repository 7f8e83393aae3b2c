//! Message sources, parsed from the `:nick!user@host` prefix.

/// The sender of a message, also known as a message's "prefix".
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Source {
    /// The name of the source, usually a nickname but sometimes a server name.
    pub nick: String,
    /// The username of the sender, if the sender is not a server.
    pub user: Option<String>,
    /// The hostname of the sender, if the sender is not a server.
    pub host: Option<String>,
}

impl Source {
    /// Parses the provided source word.
    ///
    /// The word should NOT contain the leading `:`. Parsing is tolerant:
    /// a bare server name yields a `Source` with no user or host.
    pub fn parse(word: &str) -> Source {
        let (rest, host) = match word.split_once('@') {
            Some((rest, host)) => (rest, Some(host.to_owned())),
            None => (word, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) => (nick, Some(user.to_owned())),
            None => (rest, None),
        };
        Source { nick: nick.to_owned(), user, host }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.nick)?;
        if let Some(user) = &self.user {
            write!(f, "!{user}")?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{host}")?;
        }
        Ok(())
    }
}
