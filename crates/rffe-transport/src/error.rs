/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host/port pair did not resolve to any socket address.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// Failed to connect to the controller board.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream has already been shut down.
    #[error("transport shut down")]
    Shutdown,
}

impl TransportError {
    /// True when the underlying I/O failure was a read or write timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Io(err)
            | TransportError::Connect { source: err, .. }
            | TransportError::Resolve { source: err, .. } => matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            TransportError::Shutdown => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
