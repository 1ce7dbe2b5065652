//! Register accessors and firmware upload for the RF front-end controller.
//!
//! This is the layer applications use. Connect to a board, then read and
//! write its registers through typed accessors, or push a new firmware
//! image through [`FirmwareUpload`].
//!
//! ```no_run
//! use rffe_client::{connect_with_config, ClientConfig};
//!
//! fn main() -> rffe_client::Result<()> {
//!     let mut board = connect_with_config(&ClientConfig::new("10.0.18.100"))?;
//!     board.set_attenuator(12.5)?;
//!     println!("attenuation: {} dB", board.get_attenuator()?);
//!     println!("A/C temperature: {} °C", board.get_temp_ac()?);
//!     board.close()?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod firmware;

pub use client::{value_from_text, Client, Operation};
pub use config::ClientConfig;
pub use connector::{connect, connect_with_config};
pub use error::{ClientError, Result};
pub use firmware::{FirmwareUpload, FirmwareVersion, UploadReport, UploadState};
pub use rffe_frame::{Register, RegisterValue};
