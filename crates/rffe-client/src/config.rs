use std::time::Duration;

use rffe_frame::{FrameConfig, DEFAULT_RECV_BUFFER_SIZE};
use rffe_transport::{DEFAULT_PORT, DEFAULT_TIMEOUT};

/// Connection settings for one controller board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Board hostname or IP address.
    pub host: String,
    /// TCP port. Default: 6791.
    pub port: u16,
    /// Timeout for connect and for each read and write. Default: 5 s.
    pub timeout: Duration,
    /// Bytes requested from the socket per response. Default: 1024.
    pub recv_buffer_size: usize,
}

impl ClientConfig {
    /// Settings for `host` with every other field at its default.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    pub(crate) fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            recv_buffer_size: self.recv_buffer_size,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("localhost")
    }
}
