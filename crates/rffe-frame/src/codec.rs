use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::register::{RegisterValue, ValueShape};

/// Request header: class (1) + reserved (1) + length (1) + register (1).
pub const HEADER_SIZE: usize = 4;

/// Class byte for read requests.
pub const READ_CLASS: u8 = 0x10;

/// Class byte for write requests.
pub const WRITE_CLASS: u8 = 0x20;

/// Length byte carried by every read request.
pub const READ_LENGTH: u8 = 0x01;

/// Opaque acknowledgment prefix at the start of every response.
pub const RESPONSE_PREFIX_SIZE: usize = 3;

/// Firmware images travel in blocks of this many bytes.
pub const FIRMWARE_CHUNK_SIZE: usize = 128;

/// Length byte of every firmware data frame.
///
/// The board firmware matches on this literal, so it is emitted as a
/// constant rather than derived from the chunk size.
pub const FIRMWARE_CHUNK_LENGTH: u8 = 0x81;

/// Default receive buffer for one response.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 1024;

/// Largest payload whose length still fits the one-byte length field.
const MAX_WRITE_PAYLOAD: usize = u8::MAX as usize - 1;

/// Encode a read request.
///
/// Wire format:
/// ```text
/// ┌──────┬──────┬────────┬──────────┐
/// │ 0x10 │ 0x00 │ 0x01   │ register │
/// └──────┴──────┴────────┴──────────┘
/// ```
pub fn encode_read(register_id: u8) -> Bytes {
    Bytes::copy_from_slice(&[READ_CLASS, 0x00, READ_LENGTH, register_id])
}

/// Encode a write request.
///
/// Wire format:
/// ```text
/// ┌──────┬──────┬────────────┬──────────┬─────────────────┐
/// │ 0x20 │ 0x00 │ length     │ register │ payload          │
/// │      │      │ (1B)       │          │ (length-1 bytes) │
/// └──────┴──────┴────────────┴──────────┴─────────────────┘
/// ```
///
/// The length byte counts the register byte plus the payload, which gives
/// `0x02` for one-byte values, `0x09` for doubles, `0x11` for the 16-byte
/// IP block and `0x81` for firmware blocks.
pub fn encode_write(register_id: u8, payload: &[u8]) -> Result<Bytes> {
    if payload.len() > MAX_WRITE_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_WRITE_PAYLOAD,
        });
    }
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    put_write_header(&mut dst, (payload.len() + 1) as u8, register_id);
    dst.put_slice(payload);
    Ok(dst.freeze())
}

/// Encode one firmware data frame.
pub fn encode_firmware_chunk(register_id: u8, chunk: &[u8; FIRMWARE_CHUNK_SIZE]) -> Bytes {
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + FIRMWARE_CHUNK_SIZE);
    put_write_header(&mut dst, FIRMWARE_CHUNK_LENGTH, register_id);
    dst.put_slice(chunk);
    dst.freeze()
}

fn put_write_header(dst: &mut BytesMut, length: u8, register_id: u8) {
    dst.put_u8(WRITE_CLASS);
    dst.put_u8(0x00);
    dst.put_u8(length);
    dst.put_u8(register_id);
}

/// Pack a typed value into its wire payload.
///
/// Blocks shorter than the register width are right-padded with zeros.
pub fn encode_value(value: &RegisterValue, shape: ValueShape) -> Result<Bytes> {
    match (value, shape) {
        (RegisterValue::Float(v), ValueShape::Float64) => {
            Ok(Bytes::copy_from_slice(&v.to_le_bytes()))
        }
        (RegisterValue::Byte(v), ValueShape::Byte) => Ok(Bytes::copy_from_slice(&[*v])),
        (RegisterValue::Block(block), ValueShape::Block(width)) => {
            if block.len() > width {
                return Err(FrameError::PayloadTooLarge {
                    size: block.len(),
                    max: width,
                });
            }
            let mut dst = BytesMut::with_capacity(width);
            dst.put_slice(block);
            dst.put_bytes(0, width - block.len());
            Ok(dst.freeze())
        }
        (_, expected) => Err(FrameError::ShapeMismatch {
            register: "payload",
            expected,
        }),
    }
}

/// Decode a little-endian double from a response.
pub fn decode_float(response: &[u8]) -> Result<f64> {
    let raw = value_region(response, 8)?;
    let mut le = [0u8; 8];
    le.copy_from_slice(raw);
    Ok(f64::from_le_bytes(le))
}

/// Decode the single status byte of a response.
pub fn decode_byte(response: &[u8]) -> Result<u8> {
    Ok(value_region(response, 1)?[0])
}

/// Decode a fixed-width byte block from a response.
pub fn decode_bytes(response: &[u8], length: usize) -> Result<Bytes> {
    value_region(response, length).map(Bytes::copy_from_slice)
}

/// Decode a response according to a register's wire shape.
pub fn decode_value(response: &[u8], shape: ValueShape) -> Result<RegisterValue> {
    match shape {
        ValueShape::Float64 => decode_float(response).map(RegisterValue::Float),
        ValueShape::Byte => decode_byte(response).map(RegisterValue::Byte),
        ValueShape::Block(len) => decode_bytes(response, len).map(RegisterValue::Block),
    }
}

/// The `len` value bytes following the acknowledgment prefix.
///
/// The prefix itself is never inspected.
fn value_region(response: &[u8], len: usize) -> Result<&[u8]> {
    let needed = RESPONSE_PREFIX_SIZE + len;
    response
        .get(RESPONSE_PREFIX_SIZE..needed)
        .ok_or(FrameError::ShortResponse {
            needed,
            received: response.len(),
        })
}

/// Configuration for request/response exchanges.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Bytes requested from the stream for one response. Default: 1024.
    pub recv_buffer_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}
