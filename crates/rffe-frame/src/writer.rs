use std::io::{ErrorKind, Write};

use crate::error::{FrameError, Result};

/// Write one complete request frame (blocking).
///
/// Short writes are continued until the whole frame is on the wire.
/// Timeouts surface as `FrameError::Io` with `WouldBlock` or `TimedOut`.
pub fn write_request<W: Write>(inner: &mut W, frame: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < frame.len() {
        match inner.write(&frame[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}
