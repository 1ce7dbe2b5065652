use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};

use crate::error::{Result, TransportError};
use crate::stream::RffeStream;

/// A byte stream the driver can talk to a board over.
///
/// Anything that reads, writes and can be closed qualifies: the TCP stream
/// used in production, or an in-memory stand-in for a board in tests.
pub trait Connection: Read + Write {
    /// Close the connection. Must be safe to call more than once.
    fn close(&mut self) -> Result<()>;
}

impl Connection for RffeStream {
    fn close(&mut self) -> Result<()> {
        self.shutdown()
    }
}

impl Connection for TcpStream {
    fn close(&mut self) -> Result<()> {
        match self.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(TransportError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn tcp_stream_close_twice() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (_server, _) = listener.accept().unwrap();

        Connection::close(&mut client).unwrap();
        Connection::close(&mut client).unwrap();
    }

    #[test]
    fn rffe_stream_close_delegates_to_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (_server, _) = listener.accept().unwrap();

        let mut stream = RffeStream::from_tcp(client);
        Connection::close(&mut stream).unwrap();
        assert!(stream.is_shut_down());
    }
}
