//! The driver loop that owns the session and every socket.


use crate::config::Config;
use crate::conn;
use crate::ircmsg::{codec, ClientMsg};
use crate::relay;
use crate::session::{Directive, Session};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, BufReader};
use tokio::net::{tcp, TcpListener, TcpStream, UnixListener, UnixStream};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::MissedTickBehavior;

/// How long one listener client may take to deliver its payload.
const LISTENER_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// How often housekeeping (the reconnect check) runs with no I/O activity.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What the process should do once the driver loop returns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// Exit with the given status code.
    Exit(i32),
    /// Re-execute the process with its original arguments.
    Restart,
}

struct Connection {
    read: BufReader<tcp::OwnedReadHalf>,
    write: tcp::OwnedWriteHalf,
}

enum Step {
    Tick,
    IrcLine(std::io::Result<String>),
    TcpClient(std::io::Result<TcpStream>),
    UnixClient(std::io::Result<UnixStream>),
    Shutdown(&'static str),
    Hangup,
}

/// Runs the daemon until shutdown is requested.
///
/// Only listener binding and signal-handler installation can fail here;
/// everything after startup is handled inside the loop, and IRC-side
/// failures never propagate out of it.
pub async fn run(config: &Config) -> std::io::Result<Outcome> {
    let tcp_listener = if config.no_tcp {
        None
    } else {
        let listener =
            TcpListener::bind((config.listen_address.as_str(), config.listen_port)).await?;
        tracing::info!("listening on {}:{}", config.listen_address, config.listen_port);
        Some(listener)
    };
    let unix_listener = match &config.socket_path {
        Some(path) => {
            // A stale socket file from a previous run would make bind fail.
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    return Err(e);
                }
            }
            let listener = UnixListener::bind(path)?;
            tracing::info!("listening on Unix domain socket {}", path.display());
            Some(listener)
        }
        None => None,
    };

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let mut session = Session::new(config);
    let mut connection: Option<Connection> = None;
    let mut recv_buf = Vec::new();
    let mut send_buf = Vec::new();
    let mut out: Vec<ClientMsg> = Vec::new();

    let mut tick = tokio::time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let outcome = loop {
        let step = tokio::select! {
            _ = tick.tick() => Step::Tick,
            r = next_line(connection.as_mut(), &mut recv_buf), if connection.is_some() => {
                Step::IrcLine(r)
            }
            r = accept_tcp(tcp_listener.as_ref()), if tcp_listener.is_some() => {
                Step::TcpClient(r)
            }
            r = accept_unix(unix_listener.as_ref()), if unix_listener.is_some() => {
                Step::UnixClient(r)
            }
            _ = sigint.recv() => Step::Shutdown("SIGINT"),
            _ = sigterm.recv() => Step::Shutdown("SIGTERM"),
            _ = sigquit.recv() => Step::Shutdown("SIGQUIT"),
            _ = sighup.recv() => Step::Hangup,
        };
        match step {
            Step::Tick => {
                let now = Instant::now();
                if session.reconnect_due(now) {
                    session.begin_connect(now);
                    tracing::info!(target: "notifyserv::irc", "connecting to {}", config.server);
                    match conn::connect(&config.server).await {
                        Ok(stream) => {
                            let (read, write) = stream.into_split();
                            connection = Some(Connection { read: BufReader::new(read), write });
                            recv_buf.clear();
                            session.on_connected(&mut out);
                            send_all(&mut connection, &mut session, &mut out, &mut send_buf)
                                .await;
                        }
                        Err(e) => {
                            tracing::warn!(target: "notifyserv::irc", "connect failed: {e}");
                            session.connect_failed();
                        }
                    }
                }
            }
            Step::IrcLine(Ok(line)) => {
                tracing::trace!(target: "notifyserv::irc", "recv: {line}");
                let directive = session.on_line(&line, &mut out);
                send_all(&mut connection, &mut session, &mut out, &mut send_buf).await;
                match directive {
                    Some(Directive::Disconnect) => {
                        connection = None;
                        recv_buf.clear();
                        session.on_connection_lost();
                    }
                    Some(Directive::Die { graceful }) => {
                        // The QUIT was emitted by the session and flushed above.
                        connection = None;
                        break Outcome::Exit(if graceful { 0 } else { 1 });
                    }
                    Some(Directive::Reboot) => break Outcome::Restart,
                    None => {}
                }
            }
            Step::IrcLine(Err(e)) => {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    tracing::info!(target: "notifyserv::irc", "server closed the connection");
                } else {
                    tracing::warn!(target: "notifyserv::irc", "read failed: {e}");
                }
                connection = None;
                recv_buf.clear();
                session.on_connection_lost();
            }
            Step::TcpClient(Ok(mut stream)) => {
                let text = read_client(&mut stream).await;
                let msgs = relay::relay(&text, session.channels(), "TCP");
                out.extend(msgs);
                send_all(&mut connection, &mut session, &mut out, &mut send_buf).await;
            }
            Step::UnixClient(Ok(mut stream)) => {
                let text = read_client(&mut stream).await;
                let msgs = relay::relay(&text, session.channels(), "Unix domain");
                out.extend(msgs);
                send_all(&mut connection, &mut session, &mut out, &mut send_buf).await;
            }
            Step::TcpClient(Err(e)) | Step::UnixClient(Err(e)) => {
                tracing::warn!(target: "notifyserv::relay", "accept failed: {e}");
            }
            Step::Shutdown(sig) => {
                tracing::info!("received {sig}, exiting");
                break Outcome::Exit(0);
            }
            Step::Hangup => {
                tracing::info!("ignoring SIGHUP");
            }
        }
    };

    if let Some(mut c) = connection.take() {
        let reason = if outcome == Outcome::Restart { "Rebooting" } else { "Exiting" };
        let _ = codec::send_to(&ClientMsg::quit(reason), &mut c.write, &mut send_buf).await;
    }
    if let Some(path) = &config.socket_path {
        let _ = std::fs::remove_file(path);
    }
    Ok(outcome)
}

/// Writes every queued outbound message, dropping the rest of the queue
/// and the connection on the first failure. Best effort by contract.
async fn send_all(
    connection: &mut Option<Connection>,
    session: &mut Session,
    out: &mut Vec<ClientMsg>,
    send_buf: &mut Vec<u8>,
) {
    if out.is_empty() {
        return;
    }
    let Some(mut c) = connection.take() else {
        tracing::warn!(
            target: "notifyserv::irc",
            "not connected, dropping {} outbound message(s)",
            out.len()
        );
        out.clear();
        return;
    };
    match write_queue(&mut c.write, out, send_buf).await {
        Ok(()) => *connection = Some(c),
        Err(_) => session.on_connection_lost(),
    }
}

/// Empties the queue onto the wire, stopping at the first failed write.
/// The queue is left empty whether or not every message made it out.
async fn write_queue(
    write: &mut (impl AsyncWrite + Unpin),
    out: &mut Vec<ClientMsg>,
    send_buf: &mut Vec<u8>,
) -> std::io::Result<()> {
    for msg in std::mem::take(out) {
        tracing::trace!(target: "notifyserv::irc", "send: {msg}");
        if let Err(e) = codec::send_to(&msg, write, send_buf).await {
            tracing::warn!(target: "notifyserv::irc", "write failed: {e}");
            return Err(e);
        }
    }
    Ok(())
}

async fn next_line(
    connection: Option<&mut Connection>,
    buf: &mut Vec<u8>,
) -> std::io::Result<String> {
    match connection {
        Some(c) => codec::read_line(&mut c.read, buf).await,
        None => std::future::pending().await,
    }
}

async fn accept_tcp(listener: Option<&TcpListener>) -> std::io::Result<TcpStream> {
    match listener {
        Some(listener) => listener.accept().await.map(|(stream, _)| stream),
        None => std::future::pending().await,
    }
}

async fn accept_unix(listener: Option<&UnixListener>) -> std::io::Result<UnixStream> {
    match listener {
        Some(listener) => listener.accept().await.map(|(stream, _)| stream),
        None => std::future::pending().await,
    }
}

/// Reads one listener client to EOF, bounded so a stalled peer cannot
/// wedge the loop. Whatever arrived before the deadline is still relayed.
async fn read_client(stream: &mut (impl AsyncRead + Unpin)) -> String {
    let mut data = Vec::new();
    match tokio::time::timeout(LISTENER_READ_TIMEOUT, stream.read_to_end(&mut data)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!(target: "notifyserv::relay", "listener read failed: {e}"),
        Err(_) => {
            tracing::warn!(target: "notifyserv::relay", "listener client timed out mid-write");
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}
