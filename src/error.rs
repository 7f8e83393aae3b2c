//! Error types.

/// Errors from framing or parsing an IRC line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// The line exceeds the permissible length without a terminator.
    TooLong,
    /// The line has no command or numeric.
    Empty,
    /// The command is neither alphabetic nor a three-digit numeric.
    InvalidKind,
    /// The line has a `:` prefix marker but nothing follows it.
    NoSource,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::TooLong => write!(f, "line exceeds length limit"),
            ParseError::Empty => write!(f, "missing command"),
            ParseError::InvalidKind => write!(f, "invalid command"),
            ParseError::NoSource => write!(f, "no source after prefix marker"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for std::io::Error {
    fn from(value: ParseError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, value)
    }
}

/// Errors from opening the connection to the IRC server.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConnectError {
    /// No address completed the connect within the timeout.
    Timeout,
    /// The host could not be resolved.
    Unresolvable(std::io::Error),
    /// Every resolved address refused or failed the connection.
    Refused(std::io::Error),
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectError::Timeout => write!(f, "connect timed out"),
            ConnectError::Unresolvable(e) => write!(f, "failed to resolve address: {e}"),
            ConnectError::Refused(e) => write!(f, "connection failed: {e}"),
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectError::Timeout => None,
            ConnectError::Unresolvable(e) | ConnectError::Refused(e) => Some(e),
        }
    }
}

/// Startup configuration problems that option parsing alone cannot catch.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The TCP listener is disabled and no Unix socket path was given.
    NoListener,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoListener => {
                write!(f, "no Unix domain socket path defined and TCP listener disabled")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
