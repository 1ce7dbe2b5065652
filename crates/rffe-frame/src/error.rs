use crate::register::ValueShape;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The response is too short for the value being decoded.
    #[error("short response ({received} bytes, need {needed})")]
    ShortResponse { needed: usize, received: usize },

    /// The payload does not fit the frame or register it is written to.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The value's kind does not match the register's wire shape.
    #[error("register {register} expects {expected}")]
    ShapeMismatch {
        register: &'static str,
        expected: ValueShape,
    },

    /// The value lies outside the register's accepted domain.
    #[error("invalid value for {register}: {reason}")]
    OutOfDomain {
        register: &'static str,
        reason: String,
    },

    /// A register name or id that is not in the catalog.
    #[error("unknown register '{0}'")]
    UnknownRegister(String),

    /// An I/O error occurred while writing a request or reading a response.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The board closed the connection instead of responding.
    #[error("connection closed (no response)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for errors raised before any byte reaches the wire because the
    /// caller supplied a value the register cannot carry.
    pub fn is_invalid_value(&self) -> bool {
        matches!(
            self,
            FrameError::PayloadTooLarge { .. }
                | FrameError::ShapeMismatch { .. }
                | FrameError::OutOfDomain { .. }
                | FrameError::UnknownRegister(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
