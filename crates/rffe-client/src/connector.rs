use rffe_transport::{RffeStream, TcpTransport};
use tracing::info;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;

/// Connect to a board on the default port with default timeouts.
pub fn connect(host: &str) -> Result<Client<RffeStream>> {
    connect_with_config(&ClientConfig::new(host))
}

/// Connect with explicit configuration.
pub fn connect_with_config(config: &ClientConfig) -> Result<Client<RffeStream>> {
    let stream = TcpTransport::connect(&config.host, config.port, config.timeout)?;
    info!(host = %config.host, port = config.port, "connected to RFFE controller");
    Ok(Client::with_config(stream, config.frame_config()))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::error::ClientError;

    #[test]
    fn connect_and_read_temperature() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let board = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4];
            stream.read_exact(&mut request).unwrap();
            assert_eq!(request, [0x10, 0x00, 0x01, 0x02]);
            let mut response = vec![0x11, 0x00, 0x09];
            response.extend_from_slice(&36.5f64.to_le_bytes());
            stream.write_all(&response).unwrap();
        });

        let config = ClientConfig::new("127.0.0.1").with_port(port);
        let mut client = connect_with_config(&config).unwrap();
        assert_eq!(client.get_temp_bd().unwrap(), 36.5);
        client.close().unwrap();

        board.join().unwrap();
    }

    #[test]
    fn connect_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ClientConfig::new("127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_millis(200));
        let result = connect_with_config(&config);
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
