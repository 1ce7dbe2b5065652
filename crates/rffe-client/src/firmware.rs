//! Firmware upload sequence.
//!
//! A new image goes to the board as a fixed series of write frames:
//!
//! ```text
//! Idle ──version──▶ VersionSent ──begin──▶ Uploading ──chunk*──▶ Uploading ──end──▶ Finalized
//!   any transport failure after the first frame ──▶ Aborted
//! ```
//!
//! Each frame waits for its acknowledgment before the next is written.
//! There is no resume: after `Aborted` the board is mid-update and the
//! caller has to start again from `Idle`.

use std::fmt;
use std::io::{ErrorKind, Read};
use std::str::FromStr;

use rffe_frame::{encode_firmware_chunk, encode_write, Register, FIRMWARE_CHUNK_SIZE};
use rffe_transport::Connection;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::error::{ClientError, Result};

/// Control byte that opens the transfer.
const BEGIN_TRANSFER: u8 = 0x01;

/// Control byte that closes the transfer.
const END_TRANSFER: u8 = 0x02;

/// Fill byte for the tail of the last chunk.
const CHUNK_PAD: u8 = 0xFF;

/// Firmware version announced ahead of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl FromStr for FirmwareVersion {
    type Err = ClientError;

    /// Accepts `x.y.z`; `_`, `,` and space also work as separators.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ClientError::InvalidVersionFormat(s.to_string());
        let parts: Vec<&str> = s.trim().split(['.', ',', ' ', '_']).collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(invalid());
        };
        let component = |text: &str| text.parse::<u8>().map_err(|_| invalid());
        Ok(Self {
            major: component(*major)?,
            minor: component(*minor)?,
            patch: component(*patch)?,
        })
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Where an upload currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    VersionSent,
    Uploading,
    Finalized,
    Aborted,
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadState::Idle => "idle",
            UploadState::VersionSent => "version-sent",
            UploadState::Uploading => "uploading",
            UploadState::Finalized => "finalized",
            UploadState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Summary of a finished upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Image chunks sent, including a padded final chunk.
    pub chunks: usize,
    /// Image bytes read from the source, before padding.
    pub image_bytes: usize,
    /// Frames written in total (version, begin, chunks, end).
    pub frames: usize,
}

/// One firmware upload, driven step by step over a borrowed client.
///
/// [`run`](Self::run) performs the whole sequence. The individual steps are
/// public so a caller can interleave its own progress reporting; calling
/// them out of order fails with `UploadOutOfOrder` and sends nothing.
pub struct FirmwareUpload<'c, S> {
    client: &'c mut Client<S>,
    version: FirmwareVersion,
    state: UploadState,
    report: UploadReport,
}

impl<'c, S: Connection> FirmwareUpload<'c, S> {
    pub fn new(client: &'c mut Client<S>, version: FirmwareVersion) -> Self {
        Self {
            client,
            version,
            state: UploadState::Idle,
            report: UploadReport::default(),
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn report(&self) -> UploadReport {
        self.report
    }

    /// Run every step: version, begin, the whole image, end.
    pub fn run<R: Read>(mut self, image: R) -> Result<UploadReport> {
        self.send_version()?;
        self.begin()?;
        self.send_image(image)?;
        self.finish()
    }

    /// Idle → VersionSent: announce the new version.
    ///
    /// The version rides in a firmware data frame: three version bytes,
    /// then zeros up to the full block.
    pub fn send_version(&mut self) -> Result<()> {
        self.require_state(UploadState::Idle, "send version")?;
        let mut block = [0u8; FIRMWARE_CHUNK_SIZE];
        block[..3].copy_from_slice(&[self.version.major, self.version.minor, self.version.patch]);
        let frame = encode_firmware_chunk(Register::FirmwareData.id(), &block);
        self.send(&frame)?;
        self.transition(UploadState::VersionSent);
        Ok(())
    }

    /// VersionSent → Uploading: open the transfer.
    pub fn begin(&mut self) -> Result<()> {
        self.require_state(UploadState::VersionSent, "begin transfer")?;
        let frame = encode_write(Register::FirmwareControl.id(), &[BEGIN_TRANSFER])?;
        self.send(&frame)?;
        self.transition(UploadState::Uploading);
        Ok(())
    }

    /// Send one image chunk of 1 to 128 bytes, padding it with `0xFF`.
    pub fn send_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.require_state(UploadState::Uploading, "send chunk")?;
        if chunk.is_empty() || chunk.len() > FIRMWARE_CHUNK_SIZE {
            return Err(ClientError::InvalidArgument(format!(
                "firmware chunk must be 1..={FIRMWARE_CHUNK_SIZE} bytes, got {}",
                chunk.len()
            )));
        }
        let mut block = [CHUNK_PAD; FIRMWARE_CHUNK_SIZE];
        block[..chunk.len()].copy_from_slice(chunk);
        let frame = encode_firmware_chunk(Register::FirmwareData.id(), &block);
        self.send(&frame)?;
        self.report.chunks += 1;
        self.report.image_bytes += chunk.len();
        Ok(())
    }

    /// Send the whole image, in order, one acknowledged chunk at a time.
    pub fn send_image<R: Read>(&mut self, mut image: R) -> Result<()> {
        self.require_state(UploadState::Uploading, "send image")?;
        let mut block = [0u8; FIRMWARE_CHUNK_SIZE];
        loop {
            let n = match read_chunk(&mut image, &mut block) {
                Ok(n) => n,
                Err(err) => {
                    self.abort(&err);
                    return Err(ClientError::FirmwareSource(err));
                }
            };
            if n == 0 {
                return Ok(());
            }
            self.send_chunk(&block[..n])?;
        }
    }

    /// Uploading → Finalized: close the transfer.
    ///
    /// The board reboots into the new image on its own afterwards.
    pub fn finish(&mut self) -> Result<UploadReport> {
        self.require_state(UploadState::Uploading, "finish transfer")?;
        let frame = encode_write(Register::FirmwareControl.id(), &[END_TRANSFER])?;
        self.send(&frame)?;
        self.transition(UploadState::Finalized);
        info!(
            version = %self.version,
            chunks = self.report.chunks,
            bytes = self.report.image_bytes,
            "firmware upload finalized"
        );
        Ok(self.report)
    }

    fn require_state(&self, state: UploadState, step: &'static str) -> Result<()> {
        if self.state != state {
            return Err(ClientError::UploadOutOfOrder {
                state: self.state,
                step,
            });
        }
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        match self.client.exchange_and_drain(frame) {
            Ok(_) => {
                self.report.frames += 1;
                Ok(())
            }
            Err(err) => {
                self.abort(&err);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: UploadState) {
        debug!(from = %self.state, to = %next, "firmware upload state change");
        self.state = next;
    }

    fn abort(&mut self, err: &dyn std::error::Error) {
        warn!(state = %self.state, frames = self.report.frames, error = %err, "firmware upload aborted");
        self.state = UploadState::Aborted;
    }
}

impl<S> fmt::Debug for FirmwareUpload<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirmwareUpload")
            .field("version", &self.version)
            .field("state", &self.state)
            .field("report", &self.report)
            .finish()
    }
}

/// Fill `block` from `image`, stopping early only at end of input.
fn read_chunk<R: Read>(image: &mut R, block: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < block.len() {
        match image.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
