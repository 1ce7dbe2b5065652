use std::io::{Read, Write};

use bytes::Bytes;
use tracing::trace;

use crate::codec::FrameConfig;
use crate::error::Result;
use crate::reader::read_response;
use crate::writer::write_request;

/// Half-duplex request/response exchange over any `Read + Write` stream.
///
/// Each request is followed by exactly one response read. Every method
/// takes `&mut self`, so two requests can never be in flight on one stream.
pub struct FrameStream<T> {
    inner: T,
    buf: Vec<u8>,
    config: FrameConfig,
}

impl<T: Read + Write> FrameStream<T> {
    /// Create a new frame stream with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame stream with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: vec![0u8; config.recv_buffer_size.max(1)],
            config,
        }
    }

    /// Write a request and return the response bytes.
    pub fn exchange(&mut self, request: &[u8]) -> Result<Bytes> {
        self.send(request)?;
        self.recv()
    }

    /// Write a request and discard its acknowledgment.
    ///
    /// Returns the number of acknowledgment bytes dropped.
    pub fn exchange_and_drain(&mut self, request: &[u8]) -> Result<usize> {
        self.send(request)?;
        self.drain_ack()
    }

    /// Write one request frame.
    pub fn send(&mut self, request: &[u8]) -> Result<()> {
        write_request(&mut self.inner, request)?;
        trace!(len = request.len(), opcode = ?request.get(3), "request written");
        Ok(())
    }

    /// Read one response frame.
    pub fn recv(&mut self) -> Result<Bytes> {
        let response = read_response(&mut self.inner, &mut self.buf)?;
        trace!(len = response.len(), "response read");
        Ok(Bytes::copy_from_slice(response))
    }

    /// Read one acknowledgment and drop it without inspecting its contents.
    pub fn drain_ack(&mut self) -> Result<usize> {
        let len = read_response(&mut self.inner, &mut self.buf)?.len();
        trace!(len, "acknowledgment drained");
        Ok(len)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the frame stream and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T> std::fmt::Debug for FrameStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
