//! Blocking TCP transport for the RF front-end controller.
//!
//! The controller board listens on a plain TCP port and speaks a strict
//! request/response protocol. This crate owns the socket side of that:
//! - resolving and connecting to the board
//! - disabling Nagle so small request frames leave immediately
//! - applying one fixed timeout to every read and write
//!
//! This is the lowest layer of the driver. Everything else builds on top of
//! the [`RffeStream`] type provided here.

pub mod error;
pub mod stream;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use stream::RffeStream;
pub use tcp::{TcpTransport, DEFAULT_PORT, DEFAULT_TIMEOUT};
pub use traits::Connection;
