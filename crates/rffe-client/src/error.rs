use std::io::ErrorKind;

use rffe_frame::FrameError;
use rffe_transport::TransportError;

use crate::firmware::UploadState;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error, including short responses.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The caller supplied a value the board cannot accept. Nothing was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The firmware version string is not three byte-sized integers.
    #[error("invalid firmware version '{0}' (expected x.y.z with components 0-255)")]
    InvalidVersionFormat(String),

    /// A firmware upload step was called in the wrong state.
    #[error("firmware upload cannot {step} while {state}")]
    UploadOutOfOrder {
        state: UploadState,
        step: &'static str,
    },

    /// The firmware image could not be read.
    #[error("firmware image error: {0}")]
    FirmwareSource(std::io::Error),

    /// The client was closed.
    #[error("client is closed")]
    Closed,
}

impl ClientError {
    /// True when a socket read or write ran into the I/O timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Transport(err) => err.is_timeout(),
            ClientError::Frame(FrameError::Io(err)) => {
                matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
            }
            _ => false,
        }
    }

    /// True when the board answered with fewer bytes than the value needs.
    pub fn is_short_response(&self) -> bool {
        matches!(self, ClientError::Frame(FrameError::ShortResponse { .. }))
    }

    /// True for caller mistakes that were caught before anything was sent.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidArgument(_) | ClientError::InvalidVersionFormat(_)
        )
    }

    pub(crate) fn invalid_value(err: FrameError) -> Self {
        ClientError::InvalidArgument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
