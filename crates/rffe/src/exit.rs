use std::fmt;
use std::io;

use rffe_client::ClientError;
use rffe_frame::FrameError;
use rffe_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => USAGE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Resolve { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        TransportError::Connect { ref source, .. } if is_timeout(source) => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        FrameError::UnknownRegister(_) => CliError::new(USAGE, format!("{context}: {err}")),
        FrameError::ShortResponse { .. }
        | FrameError::PayloadTooLarge { .. }
        | FrameError::ShapeMismatch { .. }
        | FrameError::OutOfDomain { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Transport(err) => transport_error(context, err),
        ClientError::Frame(err) => frame_error(context, err),
        ClientError::InvalidArgument(_) | ClientError::InvalidVersionFormat(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ClientError::FirmwareSource(source) => io_error(context, source),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_timeout_code() {
        let err = ClientError::Frame(FrameError::Io(io::Error::from(io::ErrorKind::TimedOut)));
        assert_eq!(client_error("read", err).code, TIMEOUT);
    }

    #[test]
    fn refused_connect_is_transport_error() {
        let err = ClientError::Transport(TransportError::Connect {
            host: "127.0.0.1".into(),
            port: 6791,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        });
        assert_eq!(client_error("connect", err).code, TRANSPORT_ERROR);
    }

    #[test]
    fn rejected_values_are_data_invalid() {
        let err = ClientError::InvalidArgument("attenuator out of range".into());
        assert_eq!(client_error("set", err).code, DATA_INVALID);
        let err = ClientError::Frame(FrameError::ShortResponse {
            needed: 11,
            received: 3,
        });
        assert_eq!(client_error("get", err).code, DATA_INVALID);
    }

    #[test]
    fn unknown_register_is_usage() {
        let err = FrameError::UnknownRegister("flux-capacitor".into());
        let cli = frame_error("get", err);
        assert_eq!(cli.code, USAGE);
        assert!(cli.message.contains("flux-capacitor"));
    }
}
