use std::io::{ErrorKind, Read};

use crate::error::{FrameError, Result};

/// Read one response into `buf` (blocking) and return the filled prefix.
///
/// The board writes each response in a single segment, so this issues one
/// successful `read` and does not try to reassemble. EOF before any byte is
/// `ConnectionClosed`; a read timeout surfaces as `FrameError::Io`.
pub fn read_response<'a, R: Read>(inner: &mut R, buf: &'a mut [u8]) -> Result<&'a [u8]> {
    loop {
        match inner.read(buf) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => return Ok(&buf[..n]),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}
