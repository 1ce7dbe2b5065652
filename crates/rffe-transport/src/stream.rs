use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};

/// A connected controller stream implementing `Read` and `Write`.
///
/// This is the I/O type returned by [`TcpTransport::connect`](crate::TcpTransport::connect).
/// Once [`shutdown`](Self::shutdown) has been called every read and write
/// fails with `ErrorKind::NotConnected`.
pub struct RffeStream {
    inner: TcpStream,
    peer: Option<SocketAddr>,
    shut_down: bool,
}

impl Read for RffeStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.shut_down {
            return Err(not_connected());
        }
        self.inner.read(buf)
    }
}

impl Write for RffeStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.shut_down {
            return Err(not_connected());
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.shut_down {
            return Err(not_connected());
        }
        self.inner.flush()
    }
}

impl RffeStream {
    /// Wrap an already connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            inner: stream,
            peer,
            shut_down: false,
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Enable or disable Nagle's algorithm.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        self.inner.set_nodelay(nodelay).map_err(Into::into)
    }

    /// Whether Nagle's algorithm is currently disabled.
    pub fn nodelay(&self) -> Result<bool> {
        self.inner.nodelay().map_err(Into::into)
    }

    /// Current read timeout.
    pub fn read_timeout(&self) -> Result<Option<Duration>> {
        self.inner.read_timeout().map_err(Into::into)
    }

    /// Address of the controller board, if known.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Whether [`shutdown`](Self::shutdown) has already run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Shut down both halves of the connection.
    ///
    /// Calling this more than once is a no-op. A peer that already dropped
    /// the connection is not reported as an error.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;
        match self.inner.shutdown(Shutdown::Both) {
            Ok(()) => {
                debug!(peer = ?self.peer, "controller stream shut down");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(TransportError::Io(err)),
        }
    }
}

impl Drop for RffeStream {
    fn drop(&mut self) {
        if !self.shut_down {
            let _ = self.inner.shutdown(Shutdown::Both);
        }
    }
}

impl std::fmt::Debug for RffeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RffeStream")
            .field("peer", &self.peer)
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

fn not_connected() -> std::io::Error {
    std::io::Error::new(ErrorKind::NotConnected, "controller stream is shut down")
}
