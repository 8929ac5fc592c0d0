use bytes::{Buf, Bytes, BytesMut};

use crate::error::{ChannelError, Result};
use crate::traits::{ReadChannel, WriteChannel};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// An in-memory loopback channel.
///
/// Appended bytes go to the back of a single buffer and exact reads consume
/// from the front, so whatever is written can be read straight back. Reads
/// that need more bytes than are buffered fail with
/// [`ChannelError::ShortRead`] and consume nothing.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    buf: BytesMut,
    flushes: usize,
}

impl MemoryChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            flushes: 0,
        }
    }

    /// Create a channel preloaded with `bytes` waiting to be read.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            buf: BytesMut::from(bytes.as_ref()),
            flushes: 0,
        }
    }

    /// Bytes currently buffered and not yet read.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// How many times [`WriteChannel::flush`] has been called.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Consume the channel and return the unread bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadChannel for MemoryChannel {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        if self.buf.len() < dst.len() {
            return Err(ChannelError::ShortRead {
                expected: dst.len(),
                got: self.buf.len(),
            });
        }
        self.buf.copy_to_slice(dst);
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.buf.len() < len {
            return Err(ChannelError::ShortRead {
                expected: len,
                got: self.buf.len(),
            });
        }
        Ok(self.buf.split_to(len).freeze())
    }
}

impl WriteChannel for MemoryChannel {
    fn append(&mut self, src: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
