use std::io::{ErrorKind, Read, Write};

use tracing::debug;

use crate::error::{ChannelError, Result};
use crate::traits::{ReadChannel, SplitChannel, WriteChannel};

/// Adapts any `Read + Write` stream into a byte channel.
///
/// Short reads are looped over until the destination is full; a stream that
/// reports EOF (or accepts zero bytes on write) surfaces as
/// [`ChannelError::Closed`]. `Interrupted` is retried, every other I/O error
/// is returned as-is. No buffering is added: wrap the stream yourself if the
/// transport needs it.
#[derive(Debug)]
pub struct IoChannel<T> {
    inner: T,
}

impl<T> IoChannel<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the channel and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> ReadChannel for IoChannel<T> {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < dst.len() {
            match self.inner.read(&mut dst[filled..]) {
                Ok(0) => {
                    debug!(filled, wanted = dst.len(), "stream reached EOF mid-read");
                    return Err(ChannelError::Closed);
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                    return Err(ChannelError::Closed)
                }
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }
        Ok(())
    }
}

impl<T: Write> WriteChannel for IoChannel<T> {
    fn append(&mut self, src: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < src.len() {
            match self.inner.write(&src[offset..]) {
                Ok(0) => return Err(ChannelError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }
    }
}

/// Streams that can hand out a second handle to the same connection.
pub trait TryCloneStream: Sized {
    fn try_clone_stream(&self) -> std::io::Result<Self>;
}

impl TryCloneStream for std::net::TcpStream {
    fn try_clone_stream(&self) -> std::io::Result<Self> {
        self.try_clone()
    }
}

#[cfg(unix)]
impl TryCloneStream for std::os::unix::net::UnixStream {
    fn try_clone_stream(&self) -> std::io::Result<Self> {
        self.try_clone()
    }
}

impl<T: Read + Write + TryCloneStream> SplitChannel for IoChannel<T> {
    type Reader = IoChannel<T>;
    type Writer = IoChannel<T>;

    fn split(self) -> Result<(Self::Reader, Self::Writer)> {
        let reader = self.inner.try_clone_stream()?;
        debug!("split stream channel into read and write handles");
        Ok((IoChannel::new(reader), self))
    }
}
