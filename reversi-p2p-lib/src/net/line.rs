//! Line framing over a connected byte stream.
//!
//! UTF-8 lines terminated by LF on send; LF or CRLF accepted on receive.
//! Every operation is bounded by a per-operation timeout, and a line may not
//! exceed [`MAX_LINE_LEN`] bytes on the wire.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::error::{GameError, Result};

/// Upper bound on one received line, terminator included.
pub const MAX_LINE_LEN: usize = 1024;

/// Default per-operation deadline during discovery and setup; sessions
/// raise it via [`LineTransport::set_timeout`].
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 4096;

/// Thin line-oriented wrapper over an already-connected stream.
///
/// Generic over the stream type so tests can drive it with
/// `tokio::io::duplex`; production wraps a `TcpStream`.
pub struct LineTransport<S> {
    stream: S,
    rbuf: BytesMut,
    timeout: Duration,
    closed: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> LineTransport<S> {
    pub fn new(stream: S) -> LineTransport<S> {
        LineTransport::with_timeout(stream, DEFAULT_IO_TIMEOUT)
    }

    pub fn with_timeout(stream: S, timeout: Duration) -> LineTransport<S> {
        LineTransport {
            stream,
            rbuf: BytesMut::with_capacity(READ_CHUNK),
            timeout,
            closed: false,
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Send one logical line; a single LF is appended. Refuses any string
    /// containing CR or LF without touching the stream.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        if line.contains(['\r', '\n']) {
            return Err(GameError::Protocol(
                "send_line cannot contain CR/LF".to_string(),
            ));
        }
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        match timeout(self.timeout, self.stream.write_all(&data)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(GameError::Protocol(format!("send_line failed: {e}"))),
            Err(_) => Err(GameError::Protocol("send_line timed out".to_string())),
        }
    }

    /// Receive one logical line without its terminator, coalescing and
    /// splitting TCP segments as needed.
    pub async fn recv_line(&mut self) -> Result<String> {
        loop {
            if let Some(nl) = self.rbuf.iter().position(|&b| b == b'\n') {
                let mut raw = self.rbuf.split_to(nl + 1);
                raw.truncate(nl);
                if raw.last() == Some(&b'\r') {
                    let len = raw.len();
                    raw.truncate(len - 1);
                }
                return String::from_utf8(raw.to_vec())
                    .map_err(|e| GameError::Protocol(format!("invalid UTF-8 on the wire: {e}")));
            }

            if self.rbuf.len() >= MAX_LINE_LEN {
                return Err(GameError::Protocol(
                    "incoming line exceeds max length".to_string(),
                ));
            }

            let read = timeout(self.timeout, self.stream.read_buf(&mut self.rbuf)).await;
            let n = match read {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => return Err(GameError::Protocol(format!("recv_line failed: {e}"))),
                Err(_) => return Err(GameError::Protocol("recv_line timed out".to_string())),
            };
            if n == 0 {
                return Err(GameError::Protocol("connection closed by peer".to_string()));
            }
        }
    }

    /// Idempotent close; attempts a half-shutdown before giving up the
    /// stream.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.stream.shutdown().await;
    }
}
