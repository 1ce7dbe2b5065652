//! Frame codec and register catalog for the RF front-end controller.
//!
//! Every exchange with the board is one request frame followed by one
//! response frame:
//! - A read request is the fixed header `10 00 01 <register>`
//! - A write request is `20 00 <length> <register>` followed by the payload
//! - A response is an opaque 3-byte prefix followed by the value
//!
//! The codec is pure; [`FrameStream`] adds the blocking one-request,
//! one-response exchange on top of any `Read + Write` stream.

pub mod codec;
pub mod error;
pub mod reader;
pub mod register;
pub mod stream;
pub mod writer;

pub use codec::{
    decode_byte, decode_bytes, decode_float, decode_value, encode_firmware_chunk, encode_read,
    encode_value, encode_write, FrameConfig, DEFAULT_RECV_BUFFER_SIZE, FIRMWARE_CHUNK_LENGTH,
    FIRMWARE_CHUNK_SIZE, HEADER_SIZE, READ_CLASS, RESPONSE_PREFIX_SIZE, WRITE_CLASS,
};
pub use error::{FrameError, Result};
pub use register::{
    attenuation_steps, is_valid_attenuation, Access, Register, RegisterValue, ValueShape,
};
pub use stream::FrameStream;
