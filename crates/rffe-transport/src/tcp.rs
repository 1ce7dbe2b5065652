use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::RffeStream;

/// Port the controller firmware listens on.
pub const DEFAULT_PORT: u16 = 6791;

/// Ceiling applied to connect and to every read and write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP transport to an RF front-end controller board.
///
/// Connections are opened with `TCP_NODELAY` set and the same timeout on
/// connect, read and write. There is no reconnect logic: a failed connection
/// is reported to the caller as-is.
#[derive(Debug, Clone, Copy)]
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to `host:port` using [`DEFAULT_TIMEOUT`].
    pub fn connect_default(host: &str, port: u16) -> Result<RffeStream> {
        Self::connect(host, port, DEFAULT_TIMEOUT)
    }

    /// Connect to `host:port` (blocking).
    ///
    /// Every resolved address is tried in order; the last connect error is
    /// returned when none succeed.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<RffeStream> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                port,
                source,
            })?
            .collect();

        let mut last_err = std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "host resolved to no addresses",
        );
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    let stream = RffeStream::from_tcp(stream);
                    configure(&stream, timeout)?;
                    debug!(%addr, ?timeout, "connected to controller board");
                    return Ok(stream);
                }
                Err(err) => {
                    debug!(%addr, error = %err, "connect attempt failed");
                    last_err = err;
                }
            }
        }

        Err(TransportError::Connect {
            host: host.to_string(),
            port,
            source: last_err,
        })
    }
}

fn configure(stream: &RffeStream, timeout: Duration) -> Result<()> {
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    Ok(())
}
