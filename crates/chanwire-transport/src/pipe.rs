use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::error::{ChannelError, Result};
use crate::traits::{ReadChannel, SplitChannel, WriteChannel};

/// Create a pair of connected in-process channel endpoints.
///
/// Bytes appended on one end become readable on the other once the writer
/// flushes; reads block until enough bytes have arrived. Dropping a writer
/// closes its direction: a blocked reader then fails with
/// [`ChannelError::Closed`] once the buffered bytes run out. Appended bytes
/// that were never flushed are discarded on drop.
pub fn pipe() -> (PipeEnd, PipeEnd) {
    let a_to_b = Arc::new(Shared::default());
    let b_to_a = Arc::new(Shared::default());

    let a = PipeEnd {
        reader: PipeReader {
            shared: Arc::clone(&b_to_a),
        },
        writer: PipeWriter::new(Arc::clone(&a_to_b)),
    };
    let b = PipeEnd {
        reader: PipeReader { shared: a_to_b },
        writer: PipeWriter::new(b_to_a),
    };
    (a, b)
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    readable: Condvar,
}

#[derive(Debug, Default)]
struct State {
    buf: BytesMut,
    writer_gone: bool,
    reader_gone: bool,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| ChannelError::Poisoned("pipe"))
    }
}

/// Receive half of a [`pipe`] endpoint.
#[derive(Debug)]
pub struct PipeReader {
    shared: Arc<Shared>,
}

impl ReadChannel for PipeReader {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        let mut state = self.shared.lock()?;
        loop {
            if state.buf.len() >= dst.len() {
                state.buf.copy_to_slice(dst);
                return Ok(());
            }
            if state.writer_gone {
                return Err(ChannelError::Closed);
            }
            state = self
                .shared
                .readable
                .wait(state)
                .map_err(|_| ChannelError::Poisoned("pipe"))?;
        }
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state.lock() {
            state.reader_gone = true;
        }
    }
}

/// Send half of a [`pipe`] endpoint.
#[derive(Debug)]
pub struct PipeWriter {
    shared: Arc<Shared>,
    pending: BytesMut,
}

impl PipeWriter {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            pending: BytesMut::new(),
        }
    }

    /// Bytes appended but not yet flushed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl WriteChannel for PipeWriter {
    fn append(&mut self, src: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut state = self.shared.lock()?;
        if state.reader_gone {
            return Err(ChannelError::Closed);
        }
        state.buf.unsplit(self.pending.split());
        self.shared.readable.notify_all();
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            debug!(discarded = self.pending.len(), "pipe writer dropped with unflushed bytes");
        }
        if let Ok(mut state) = self.shared.state.lock() {
            state.writer_gone = true;
        }
        self.shared.readable.notify_all();
    }
}

/// One end of an in-process [`pipe`].
#[derive(Debug)]
pub struct PipeEnd {
    reader: PipeReader,
    writer: PipeWriter,
}

impl ReadChannel for PipeEnd {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        self.reader.read_exact(dst)
    }
}

impl WriteChannel for PipeEnd {
    fn append(&mut self, src: &[u8]) -> Result<()> {
        self.writer.append(src)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }
}

impl SplitChannel for PipeEnd {
    type Reader = PipeReader;
    type Writer = PipeWriter;

    fn split(self) -> Result<(Self::Reader, Self::Writer)> {
        Ok((self.reader, self.writer))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn flushed_bytes_cross_the_pipe() {
        let (mut a, mut b) = pipe();
        a.append(b"hello").unwrap();
        a.flush().unwrap();

        let mut out = [0u8; 5];
        b.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn directions_are_independent() {
        let (mut a, mut b) = pipe();
        a.append(b"a->b").unwrap();
        a.flush().unwrap();
        b.append(b"b->a").unwrap();
        b.flush().unwrap();

        let mut out = [0u8; 4];
        a.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"b->a");
        b.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"a->b");
    }

    #[test]
    fn unflushed_bytes_stay_pending() {
        let (a, _b) = pipe();
        let (_reader, mut writer) = a.split().unwrap();
        writer.append(b"later").unwrap();
        assert_eq!(writer.pending(), 5);
        writer.flush().unwrap();
        assert_eq!(writer.pending(), 0);
    }

    #[test]
    fn reader_blocks_until_enough_bytes() {
        let (a, b) = pipe();
        let (_a_reader, mut a_writer) = a.split().unwrap();
        let (mut b_reader, _b_writer) = b.split().unwrap();

        let handle = thread::spawn(move || {
            let mut out = [0u8; 6];
            b_reader.read_exact(&mut out).unwrap();
            out
        });

        a_writer.append(b"abc").unwrap();
        a_writer.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
        a_writer.append(b"def").unwrap();
        a_writer.flush().unwrap();

        assert_eq!(&handle.join().unwrap(), b"abcdef");
    }

    #[test]
    fn dropped_writer_closes_reader() {
        let (a, mut b) = pipe();
        let (_a_reader, mut a_writer) = a.split().unwrap();
        a_writer.append(b"xy").unwrap();
        a_writer.flush().unwrap();
        a_writer.append(b"lost").unwrap();
        drop(a_writer);

        let mut out = [0u8; 2];
        b.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"xy");
        assert!(matches!(b.read_exact(&mut out), Err(ChannelError::Closed)));
    }

    #[test]
    fn flush_after_reader_dropped_is_closed() {
        let (mut a, b) = pipe();
        drop(b);
        a.append(b"nobody").unwrap();
        assert!(matches!(a.flush(), Err(ChannelError::Closed)));
    }
}
