//! Receive buffer
//!
//! Accumulates bytes read from a transport and peels complete frames off the
//! front. Whatever trails the last complete frame stays buffered until the
//! next read fills it in.

use std::io::{self, Read};

use bytes::{Buf, BytesMut};

use super::codec::{self, WireMessage};
use crate::error::Result;

/// Default read chunk size (64 KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Growable buffer of received bytes awaiting decoding
#[derive(Debug)]
pub struct ReceiveBuffer {
    /// Undecoded bytes; always starts at a frame boundary
    buffer: BytesMut,
}

impl ReceiveBuffer {
    /// Create a buffer with `capacity` bytes preallocated
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Direct access to the backing buffer, for appending received bytes
    pub fn current_buffer(&mut self) -> &mut BytesMut {
        &mut self.buffer
    }

    /// Append received bytes
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of undecoded bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Perform one `read` from `reader`, appending at most `chunk_size` bytes
    ///
    /// Returns the number of bytes read; `0` means the peer closed the stream.
    pub fn read_from<R: Read>(&mut self, reader: &mut R, chunk_size: usize) -> io::Result<usize> {
        let start = self.buffer.len();
        self.buffer.resize(start + chunk_size, 0);

        match reader.read(&mut self.buffer[start..]) {
            Ok(n) => {
                self.buffer.truncate(start + n);
                Ok(n)
            }
            Err(e) => {
                self.buffer.truncate(start);
                Err(e)
            }
        }
    }

    /// Decode the next complete message, if one is buffered
    ///
    /// `Ok(None)` means only a partial frame (or nothing) is buffered; the
    /// bytes are kept as they are.
    pub fn next_message<M: WireMessage>(&mut self) -> Result<Option<M>> {
        match codec::decode::<M>(&self.buffer, 0) {
            Ok((message, consumed)) => {
                self.buffer.advance(consumed);
                Ok(Some(message))
            }
            Err(e) if e.is_partial_frame() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Decode every complete message currently buffered
    pub fn drain_messages<M: WireMessage>(&mut self) -> Result<Vec<M>> {
        let mut messages = Vec::new();
        while let Some(message) = self.next_message()? {
            messages.push(message);
        }
        Ok(messages)
    }
}

impl Default for ReceiveBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }
}
