//! Options for connecting to the IRC server.

use crate::error::ConnectError;
use std::time::Duration;
use tokio::net::TcpStream;

/// How long a connect attempt may take before it is abandoned.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// The address of the IRC server to connect to.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ServerAddr {
    /// The host to connect to.
    pub host: String,
    /// An optional port number if a non-default one should be used.
    pub port: Option<u16>,
}

impl ServerAddr {
    /// Returns the port number that should be used for connecting.
    pub fn port_num(&self) -> u16 {
        self.port.unwrap_or(6667)
    }
}

impl std::str::FromStr for ServerAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = match s.split_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| format!("invalid port in \"{s}\""))?;
                (host, Some(port))
            }
            None => (s, None),
        };
        if host.is_empty() {
            return Err("empty server address".to_owned());
        }
        Ok(ServerAddr { host: host.to_owned(), port })
    }
}

impl std::fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port_num())
    }
}

/// Opens the connection to the IRC server.
///
/// The host is resolved to its IPv4 and IPv6 addresses and each candidate
/// is tried in resolver order; the first to connect wins. The whole attempt
/// is bounded by [`CONNECT_TIMEOUT`].
pub async fn connect(addr: &ServerAddr) -> Result<TcpStream, ConnectError> {
    let attempt = async {
        let candidates = tokio::net::lookup_host((addr.host.as_str(), addr.port_num()))
            .await
            .map_err(ConnectError::Unresolvable)?;
        let mut last_err = None;
        for candidate in candidates {
            match TcpStream::connect(candidate).await {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(ConnectError::Refused(last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "host resolved to no addresses")
        })))
    };
    match tokio::time::timeout(CONNECT_TIMEOUT, attempt).await {
        Ok(result) => result,
        Err(_) => Err(ConnectError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::ServerAddr;

    #[test]
    fn parse_host_only() {
        let addr: ServerAddr = "irc.example.org".parse().unwrap();
        assert_eq!(addr.host, "irc.example.org");
        assert_eq!(addr.port_num(), 6667);
    }

    #[test]
    fn parse_host_and_port() {
        let addr: ServerAddr = "irc.example.org:6697".parse().unwrap();
        assert_eq!(addr.port, Some(6697));
        assert_eq!(addr.to_string(), "irc.example.org:6697");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("irc.example.org:notaport".parse::<ServerAddr>().is_err());
        assert!("".parse::<ServerAddr>().is_err());
    }
}
