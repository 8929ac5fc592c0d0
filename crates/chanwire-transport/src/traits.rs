use bytes::Bytes;

use crate::error::Result;

/// The receive half of a byte channel.
///
/// Implementations deliver bytes in the order the peer appended them and
/// never hand back a partially filled buffer on success.
pub trait ReadChannel {
    /// Fill `dst` completely, or fail.
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()>;

    /// Read exactly `len` bytes into a freshly allocated buffer of that size.
    fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Largest length or count prefix a decoder should accept from this
    /// channel. `None` means unbounded.
    fn length_limit(&self) -> Option<u64> {
        None
    }
}

/// The send half of a byte channel.
pub trait WriteChannel {
    /// Queue `src` behind everything appended so far.
    fn append(&mut self, src: &[u8]) -> Result<()>;

    /// Make all previously appended bytes visible to the peer.
    fn flush(&mut self) -> Result<()>;
}

/// An ordered, bidirectional byte stream.
///
/// Blanket-implemented for anything that is both a [`ReadChannel`] and a
/// [`WriteChannel`].
pub trait ByteChannel: ReadChannel + WriteChannel {}

impl<T: ReadChannel + WriteChannel> ByteChannel for T {}

/// A channel that can be separated into independently owned halves, so the
/// two directions can be driven from different threads.
pub trait SplitChannel {
    type Reader: ReadChannel;
    type Writer: WriteChannel;

    /// Separate the channel into its receive and send halves.
    fn split(self) -> Result<(Self::Reader, Self::Writer)>;
}

impl<T: ReadChannel + ?Sized> ReadChannel for &mut T {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        (**self).read_exact(dst)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        (**self).read_bytes(len)
    }

    fn length_limit(&self) -> Option<u64> {
        (**self).length_limit()
    }
}

impl<T: WriteChannel + ?Sized> WriteChannel for &mut T {
    fn append(&mut self, src: &[u8]) -> Result<()> {
        (**self).append(src)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<T: ReadChannel + ?Sized> ReadChannel for Box<T> {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        (**self).read_exact(dst)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        (**self).read_bytes(len)
    }

    fn length_limit(&self) -> Option<u64> {
        (**self).length_limit()
    }
}

impl<T: WriteChannel + ?Sized> WriteChannel for Box<T> {
    fn append(&mut self, src: &[u8]) -> Result<()> {
        (**self).append(src)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
