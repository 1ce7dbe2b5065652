//! Driver for the RF front-end controller board.
//!
//! The board exposes its attenuator, temperature loops, heaters and network
//! settings as numbered registers behind a small binary protocol on TCP.
//! It also accepts new firmware over the same connection.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP connection with fixed I/O timeouts
//! - [`frame`]: request encoding, response decoding and the register catalog
//! - [`client`]: typed register accessors and firmware upload (behind the `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use rffe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use rffe_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use rffe_client::*;
}
