//! Startup configuration.

use crate::conn::ServerAddr;
use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Connect to IRC and relay every message received on the listener.
#[derive(Parser, Clone, Debug)]
#[command(name = "notifyserv", version)]
pub struct Config {
    /// Output channel(s), may be given more than once.
    #[arg(
        short = 'c',
        long = "channel",
        value_name = "CHANNEL",
        value_delimiter = ',',
        required = true
    )]
    pub channels: Vec<String>,
    /// IRC server, default port is 6667.
    #[arg(short = 's', long = "server", value_name = "ADDRESS[:PORT]")]
    pub server: ServerAddr,
    /// IRC nick.
    #[arg(short = 'n', long, default_value = "notifyserv")]
    pub nick: String,
    /// IRC ident.
    #[arg(short = 'i', long, default_value = "notify")]
    pub ident: String,
    /// Listen on the specified address.
    #[arg(short = 'l', long = "listen-address", value_name = "ADDRESS", default_value = "localhost")]
    pub listen_address: String,
    /// Listening port.
    #[arg(short = 'p', long = "listen-port", value_name = "PORT", default_value_t = 8675)]
    pub listen_port: u16,
    /// Disable the TCP listener.
    #[arg(short = 'd', long = "no-tcp")]
    pub no_tcp: bool,
    /// Path to a Unix domain socket to listen on.
    #[arg(short = 'u', long = "socket-path", value_name = "PATH")]
    pub socket_path: Option<PathBuf>,
    /// Run in the foreground and log to stdout.
    #[arg(short = 'f', long)]
    pub foreground: bool,
    /// Increase logging verbosity, may be given more than once.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Config {
    /// Checks the constraints that option parsing alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.no_tcp && self.socket_path.is_none() {
            return Err(ConfigError::NoListener);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use clap::Parser;

    #[test]
    fn parses_minimal_options() {
        let config =
            Config::parse_from(["notifyserv", "-c", "#ops,#alerts", "-s", "irc.example.org"]);
        assert_eq!(config.channels, ["#ops", "#alerts"]);
        assert_eq!(config.server.host, "irc.example.org");
        assert_eq!(config.server.port_num(), 6667);
        assert_eq!(config.nick, "notifyserv");
        assert_eq!(config.ident, "notify");
        assert_eq!(config.listen_address, "localhost");
        assert_eq!(config.listen_port, 8675);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn requires_channels_and_server() {
        assert!(Config::try_parse_from(["notifyserv", "-s", "irc.example.org"]).is_err());
        assert!(Config::try_parse_from(["notifyserv", "-c", "#ops"]).is_err());
    }

    #[test]
    fn rejects_no_listener_at_all() {
        let config =
            Config::parse_from(["notifyserv", "-c", "#ops", "-s", "irc.example.org", "-d"]);
        assert!(config.validate().is_err());
    }
}
