//! Protocol codec
//!
//! Encoding and decoding of length-delimited frames.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────────┬─────────────────────────────────┐
//! │ Len (varint) │  Serialized message (Len bytes) │
//! └──────────────┴─────────────────────────────────┘
//! ```
//!
//! The codec owns no buffers. `decode` takes the caller's buffer and an
//! offset and hands back the offset just past the decoded frame; the caller
//! keeps everything from that offset onwards for the next read.

use std::io::{self, Read, Write};

use bincode::Options;
use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::varint::{self, MAX_VARINT_LEN};
use crate::error::{BridgeError, Result};

/// Upper bound on the body buffer reserved up front by `read_frame`
const MAX_BODY_PREALLOC: usize = 64 * 1024;

// =============================================================================
// Message Trait
// =============================================================================

/// A value that can be carried as the body of a frame
pub trait WireMessage: Sized {
    /// Serialize the message to its raw body bytes
    fn to_wire_bytes(&self) -> Result<Vec<u8>>;

    /// Parse a message from exactly one frame body
    fn from_wire_bytes(bytes: &[u8]) -> Result<Self>;
}

impl WireMessage for Vec<u8> {
    fn to_wire_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn from_wire_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}

impl WireMessage for Bytes {
    fn to_wire_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_vec())
    }

    fn from_wire_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Bytes::copy_from_slice(bytes))
    }
}

/// bincode settings shared by every serde-backed message
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
}

/// Serialize a serde message body with bincode
pub(crate) fn serialize_body<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    bincode_options()
        .serialize(message)
        .map_err(|e| BridgeError::Serialization(e.to_string()))
}

/// Deserialize a serde message body with bincode
pub(crate) fn deserialize_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode_options()
        .deserialize(bytes)
        .map_err(|e| BridgeError::Serialization(e.to_string()))
}

// =============================================================================
// Frame Encoding
// =============================================================================

/// Encode a message as a complete frame
///
/// Format: varint(body_len) + body
pub fn encode<M: WireMessage>(message: &M) -> Result<Vec<u8>> {
    let body = message.to_wire_bytes()?;

    let mut frame = Vec::with_capacity(varint::encoded_len(body.len() as u64) + body.len());
    varint::encode(body.len() as u64, &mut frame);
    frame.extend_from_slice(&body);

    Ok(frame)
}

/// Append a frame for `message` to an outgoing buffer
///
/// Returns the number of bytes appended.
pub fn encode_into<M: WireMessage>(message: &M, out: &mut BytesMut) -> Result<usize> {
    let body = message.to_wire_bytes()?;
    let (prefix, prefix_len) = varint::encode_to_array(body.len() as u64);

    out.reserve(prefix_len + body.len());
    out.put_slice(&prefix[..prefix_len]);
    out.put_slice(&body);

    Ok(prefix_len + body.len())
}

// =============================================================================
// Frame Decoding
// =============================================================================

/// Locate the frame starting at `offset` without parsing its body
///
/// Returns the body slice and the offset just past the frame.
pub fn decode_frame(buffer: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let Some(remaining) = buffer.get(offset..) else {
        return Err(BridgeError::CorruptFrame(format!(
            "offset {} is past the end of a {} byte buffer",
            offset,
            buffer.len()
        )));
    };

    let (body_len, prefix_len) = varint::decode(remaining)?;

    let body_len = usize::try_from(body_len).map_err(|_| {
        BridgeError::CorruptFrame(format!("frame length {} does not fit in memory", body_len))
    })?;

    let body_start = offset + prefix_len;
    let Some(body_end) = body_start.checked_add(body_len) else {
        return Err(BridgeError::CorruptFrame(format!(
            "frame length {} overflows the buffer offset",
            body_len
        )));
    };

    if body_end > buffer.len() {
        return Err(BridgeError::PartialFrame {
            available: buffer.len() - offset,
            required: body_end - offset,
        });
    }

    Ok((&buffer[body_start..body_end], body_end))
}

/// Decode one message starting at `offset`
///
/// Returns the message and the offset just past its frame. On
/// `PartialFrame` nothing has been consumed: append more bytes and call
/// again with the same offset.
pub fn decode<M: WireMessage>(buffer: &[u8], offset: usize) -> Result<(M, usize)> {
    let (body, new_offset) = decode_frame(buffer, offset)?;
    let message = M::from_wire_bytes(body)?;
    Ok((message, new_offset))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write one framed message to a stream
pub fn write_frame<W: Write, M: WireMessage>(writer: &mut W, message: &M) -> Result<()> {
    let bytes = encode(message)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read one framed message from a stream
///
/// Blocks until a complete frame is received or an error occurs.
pub fn read_frame<R: Read, M: WireMessage>(reader: &mut R) -> Result<M> {
    // Read the length prefix one byte at a time
    let mut prefix = [0u8; MAX_VARINT_LEN];
    let mut prefix_len = 0;
    let body_len = loop {
        if prefix_len == MAX_VARINT_LEN {
            return Err(BridgeError::CorruptFrame(format!(
                "varint longer than {} bytes",
                MAX_VARINT_LEN
            )));
        }
        reader.read_exact(&mut prefix[prefix_len..prefix_len + 1])?;
        prefix_len += 1;

        match varint::decode(&prefix[..prefix_len]) {
            Ok((len, _)) => break len,
            Err(e) if e.is_partial_frame() => continue,
            Err(e) => return Err(e),
        }
    };

    let expected = usize::try_from(body_len).map_err(|_| {
        BridgeError::CorruptFrame(format!("frame length {} does not fit in memory", body_len))
    })?;

    // Read body; the buffer grows with the bytes that actually arrive
    let mut body = Vec::with_capacity(expected.min(MAX_BODY_PREALLOC));
    let read = reader.by_ref().take(body_len).read_to_end(&mut body)?;
    if read != expected {
        return Err(BridgeError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("frame body ended after {} of {} bytes", read, expected),
        )));
    }

    M::from_wire_bytes(&body)
}
