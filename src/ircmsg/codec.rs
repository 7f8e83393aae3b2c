//! Line framing for the IRC connection.

use super::ClientMsg;
use crate::error::ParseError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The length of the longest permissible IRC line, terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Reads one complete line from `read`, stripping the trailing CR?LF.
///
/// LF-only termination is tolerated on input. Empty lines are skipped.
/// If more than [`MAX_LINE_LEN`] bytes arrive without a terminator, this
/// fails with [`ParseError::TooLong`]; the caller should treat that as a
/// connection error.
///
/// `buf` must either be empty or contain a partial line from a previous
/// call that was cancelled or errored due to non-blocking I/O.
/// Other errors may leave `buf` in an invalid state for future calls.
pub async fn read_line(
    read: &mut (impl AsyncBufRead + Unpin),
    buf: &mut Vec<u8>,
) -> std::io::Result<String> {
    let mut read = read.take(1);
    loop {
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            if buf.is_empty() {
                continue;
            }
            let line = String::from_utf8_lossy(buf).into_owned();
            buf.clear();
            return Ok(line);
        }
        // A read that was supposed to stop at the newline filled the whole
        // accumulator without finding one: the peer is over the limit.
        if buf.len() >= MAX_LINE_LEN {
            return Err(ParseError::TooLong.into());
        }
        read.set_limit((MAX_LINE_LEN - buf.len()) as u64);
        if read.read_until(b'\n', buf).await? == 0 {
            // EOF. Any partial line stays in the accumulator.
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        }
    }
}

/// Writes `msg` to `write` WITH a trailing CRLF, using the provided buffer
/// to minimize the necessary number of writes to `write`.
///
/// All outbound traffic goes through here so that the length and
/// termination contract is enforced in one place. Messages that would
/// exceed [`MAX_LINE_LEN`] fail with [`ParseError::TooLong`] and are not
/// sent. The buffer is cleared in every case.
pub async fn send_to(
    msg: &ClientMsg,
    write: &mut (impl AsyncWrite + Unpin),
    buf: &mut Vec<u8>,
) -> std::io::Result<()> {
    use std::io::Write;
    buf.clear();
    write!(buf, "{msg}")?;
    buf.extend_from_slice(b"\r\n");
    if buf.len() > MAX_LINE_LEN {
        buf.clear();
        return Err(ParseError::TooLong.into());
    }
    let result = write.write_all(buf).await;
    buf.clear();
    result
}
