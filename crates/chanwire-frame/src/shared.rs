use std::sync::{Mutex, MutexGuard, TryLockError};

use bytes::Bytes;
use chanwire_codec::{Decode, Encode, Result as CodecResult};
use chanwire_transport::{ChannelError, ReadChannel, Result, SplitChannel, WriteChannel};
use tracing::{debug, trace};

use crate::config::ChannelConfig;

/// A channel shared between threads, with one lock per direction.
///
/// The write lock frames a logical message on the send side and the read
/// lock frames one on the receive side. Holding one never blocks the other,
/// so a thread can receive while another sends. Within one direction,
/// framed sections run in mutual exclusion and their bytes never interleave.
///
/// A section starts with [`begin_send`](Self::begin_send) or
/// [`begin_receive`](Self::begin_receive) and ends when the returned guard
/// is dropped or passed to `end()`. Release happens on every exit path,
/// including early returns from a failed encode or decode.
#[derive(Debug)]
pub struct SharedChannel<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
    config: ChannelConfig,
}

impl<R, W> SharedChannel<R, W>
where
    R: ReadChannel,
    W: WriteChannel,
{
    /// Wrap separately owned halves with the default configuration.
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ChannelConfig::default())
    }

    /// Wrap separately owned halves with explicit configuration.
    pub fn with_config(reader: R, writer: W, config: ChannelConfig) -> Self {
        debug!(max_length = ?config.max_length, "shared channel created");
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            config,
        }
    }

    /// Split `channel` into halves and share them with the default configuration.
    pub fn from_split<C>(channel: C) -> Result<Self>
    where
        C: SplitChannel<Reader = R, Writer = W>,
    {
        Self::from_split_with_config(channel, ChannelConfig::default())
    }

    /// Split `channel` into halves and share them with explicit configuration.
    pub fn from_split_with_config<C>(channel: C, config: ChannelConfig) -> Result<Self>
    where
        C: SplitChannel<Reader = R, Writer = W>,
    {
        let (reader, writer) = channel.split()?;
        Ok(Self::with_config(reader, writer, config))
    }

    /// Current configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Acquire the write lock, blocking until it is free.
    pub fn begin_send(&self) -> Result<SendGuard<'_, W>> {
        let inner = self
            .writer
            .lock()
            .map_err(|_| ChannelError::Poisoned("write"))?;
        trace!(direction = "send", "framing lock acquired");
        Ok(SendGuard { inner })
    }

    /// Acquire the write lock only if no other section holds it.
    pub fn try_begin_send(&self) -> Result<Option<SendGuard<'_, W>>> {
        match self.writer.try_lock() {
            Ok(inner) => {
                trace!(direction = "send", "framing lock acquired");
                Ok(Some(SendGuard { inner }))
            }
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Poisoned(_)) => Err(ChannelError::Poisoned("write")),
        }
    }

    /// Acquire the read lock, blocking until it is free.
    pub fn begin_receive(&self) -> Result<ReceiveGuard<'_, R>> {
        let inner = self
            .reader
            .lock()
            .map_err(|_| ChannelError::Poisoned("read"))?;
        trace!(direction = "receive", "framing lock acquired");
        Ok(ReceiveGuard {
            inner,
            max_length: self.config.max_length,
        })
    }

    /// Acquire the read lock only if no other section holds it.
    pub fn try_begin_receive(&self) -> Result<Option<ReceiveGuard<'_, R>>> {
        match self.reader.try_lock() {
            Ok(inner) => {
                trace!(direction = "receive", "framing lock acquired");
                Ok(Some(ReceiveGuard {
                    inner,
                    max_length: self.config.max_length,
                }))
            }
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Poisoned(_)) => Err(ChannelError::Poisoned("read")),
        }
    }

    /// Run `f` inside a send section.
    ///
    /// The write lock is released when `f` returns, whether it succeeded or
    /// not. Flushing is left to `f`.
    pub fn with_send<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn WriteChannel) -> std::result::Result<T, E>,
        E: From<ChannelError>,
    {
        let mut guard = self.begin_send()?;
        f(&mut guard)
    }

    /// Run `f` inside a receive section.
    pub fn with_receive<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn ReadChannel) -> std::result::Result<T, E>,
        E: From<ChannelError>,
    {
        let mut guard = self.begin_receive()?;
        f(&mut guard)
    }

    /// Encode `value` and flush it as one framed message.
    pub fn send<T: Encode + ?Sized>(&self, value: &T) -> CodecResult<()> {
        self.with_send(|ch| {
            value.encode(ch)?;
            ch.flush()?;
            Ok(())
        })
    }

    /// Decode one value of type `T` as one framed message.
    pub fn receive<T: Decode>(&self) -> CodecResult<T> {
        self.with_receive(|ch| T::decode(ch))
    }

    /// Take the halves back out of the channel.
    pub fn into_parts(self) -> Result<(R, W)> {
        let reader = self
            .reader
            .into_inner()
            .map_err(|_| ChannelError::Poisoned("read"))?;
        let writer = self
            .writer
            .into_inner()
            .map_err(|_| ChannelError::Poisoned("write"))?;
        Ok((reader, writer))
    }
}

/// An open send section. Dropping it releases the write lock.
pub struct SendGuard<'a, W> {
    inner: MutexGuard<'a, W>,
}

impl<W> SendGuard<'_, W> {
    /// End the send section.
    pub fn end(self) {}
}

impl<W: WriteChannel> WriteChannel for SendGuard<'_, W> {
    fn append(&mut self, src: &[u8]) -> Result<()> {
        self.inner.append(src)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

impl<W> Drop for SendGuard<'_, W> {
    fn drop(&mut self) {
        trace!(direction = "send", "framing lock released");
    }
}

/// An open receive section. Dropping it releases the read lock.
///
/// Decoders reading through the guard see the channel's configured length
/// bound via [`ReadChannel::length_limit`].
pub struct ReceiveGuard<'a, R> {
    inner: MutexGuard<'a, R>,
    max_length: Option<u64>,
}

impl<R> ReceiveGuard<'_, R> {
    /// End the receive section.
    pub fn end(self) {}
}

impl<R: ReadChannel> ReadChannel for ReceiveGuard<'_, R> {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        self.inner.read_exact(dst)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.inner.read_bytes(len)
    }

    fn length_limit(&self) -> Option<u64> {
        match (self.max_length, self.inner.length_limit()) {
            (Some(ours), Some(theirs)) => Some(ours.min(theirs)),
            (ours, theirs) => ours.or(theirs),
        }
    }
}

impl<R> Drop for ReceiveGuard<'_, R> {
    fn drop(&mut self) {
        trace!(direction = "receive", "framing lock released");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use chanwire_codec::{deserialize_seq, serialize_seq, CodecError};
    use chanwire_transport::{pipe, PipeReader, PipeWriter};

    use super::*;

    type PipeChannel = SharedChannel<PipeReader, PipeWriter>;

    fn connected_pair() -> (PipeChannel, PipeChannel) {
        let (a, b) = pipe();
        (
            SharedChannel::from_split(a).unwrap(),
            SharedChannel::from_split(b).unwrap(),
        )
    }

    #[test]
    fn send_then_receive_across_the_pair() {
        let (left, right) = connected_pair();
        left.send(&(7u8, true)).unwrap();
        assert_eq!(right.receive::<(u8, bool)>().unwrap(), (7, true));
    }

    #[test]
    fn explicit_begin_and_end() {
        let (left, right) = connected_pair();

        let mut tx = left.begin_send().unwrap();
        serialize_seq!(&mut tx, 1u32, "call").unwrap();
        tx.flush().unwrap();
        tx.end();

        let mut rx = right.begin_receive().unwrap();
        let (mut id, mut name) = (0u32, String::new());
        deserialize_seq!(&mut rx, id, name).unwrap();
        rx.end();

        assert_eq!((id, name.as_str()), (1, "call"));
    }

    #[test]
    fn second_sender_waits_for_the_first() {
        let (left, _right) = connected_pair();
        let left = Arc::new(left);

        let first = left.begin_send().unwrap();
        let (acquired_tx, acquired_rx) = mpsc::channel();
        let contender = {
            let left = Arc::clone(&left);
            thread::spawn(move || {
                let guard = left.begin_send().unwrap();
                acquired_tx.send(()).unwrap();
                guard.end();
            })
        };

        assert!(
            acquired_rx.recv_timeout(Duration::from_millis(100)).is_err(),
            "second begin_send proceeded while the first section was open"
        );
        first.end();
        acquired_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("second sender should proceed after end");
        contender.join().unwrap();
    }

    #[test]
    fn open_receive_does_not_block_send() {
        let (left, _right) = connected_pair();
        let left = Arc::new(left);

        let _receiving = left.begin_receive().unwrap();
        let (done_tx, done_rx) = mpsc::channel();
        let sender = {
            let left = Arc::clone(&left);
            thread::spawn(move || {
                left.send(&42u64).unwrap();
                done_tx.send(()).unwrap();
            })
        };

        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("send must not wait on the read lock");
        sender.join().unwrap();
    }

    #[test]
    fn failed_section_still_releases_the_lock() {
        let (left, right) = connected_pair();
        left.send(&1u8).unwrap();
        drop(left);

        let err = right.receive::<(u8, u32)>().unwrap_err();
        assert!(matches!(err.as_channel(), Some(ChannelError::Closed)));
        assert!(right.try_begin_receive().unwrap().is_some());

        let result: CodecResult<()> =
            right.with_send(|_| Err(CodecError::ShapeMismatch("caller bailed".into())));
        assert!(result.is_err());
        assert!(right.try_begin_send().unwrap().is_some());
    }

    #[test]
    fn try_begin_reports_a_held_lock() {
        let (left, _right) = connected_pair();
        let held = left.begin_send().unwrap();
        assert!(left.try_begin_send().unwrap().is_none());
        assert!(left.try_begin_receive().unwrap().is_some());
        drop(held);
        assert!(left.try_begin_send().unwrap().is_some());
    }

    #[test]
    fn receive_section_enforces_length_bound() {
        let (a, b) = pipe();
        let left = SharedChannel::from_split(a).unwrap();
        let right =
            SharedChannel::from_split_with_config(b, ChannelConfig::with_max_length(4)).unwrap();

        left.send("four").unwrap();
        assert_eq!(right.receive::<String>().unwrap(), "four");

        left.send("fives").unwrap();
        let err = right.receive::<String>().unwrap_err();
        assert!(matches!(err, CodecError::LengthExceeded { len: 5, max: 4 }));
    }

    #[test]
    fn unbounded_config_has_no_length_limit() {
        let (a, _b) = pipe();
        let ch = SharedChannel::from_split_with_config(a, ChannelConfig::unbounded()).unwrap();
        assert_eq!(ch.begin_receive().unwrap().length_limit(), None);
    }

    #[test]
    fn concurrent_senders_never_interleave() {
        let (left, right) = connected_pair();
        let left = Arc::new(left);

        let senders: Vec<_> = (0..8u32)
            .map(|id| {
                let left = Arc::clone(&left);
                thread::spawn(move || {
                    for round in 0..16u32 {
                        left.send(&(id, vec![id ^ round; 32])).unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..8 * 16 {
            let (id, body) = right.receive::<(u32, Vec<u32>)>().unwrap();
            assert!(id < 8);
            assert_eq!(body.len(), 32);
            assert!(body.iter().all(|word| *word == body[0]));
            assert!(body[0] ^ id < 16);
        }

        for sender in senders {
            sender.join().unwrap();
        }
    }

    #[test]
    fn panic_inside_a_section_poisons_that_direction() {
        let (left, _right) = connected_pair();
        let left = Arc::new(left);

        let crashed = {
            let left = Arc::clone(&left);
            thread::spawn(move || {
                let _guard = left.begin_send().unwrap();
                panic!("sender crashed mid-message");
            })
        };
        assert!(crashed.join().is_err());

        assert!(matches!(left.begin_send(), Err(ChannelError::Poisoned("write"))));
        assert!(left.begin_receive().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn from_split_infers_halves_from_the_stream() {
        use chanwire_transport::IoChannel;
        use std::os::unix::net::UnixStream;

        let (a, b) = UnixStream::pair().unwrap();
        let left: SharedChannel<IoChannel<UnixStream>, IoChannel<UnixStream>> =
            SharedChannel::from_split(IoChannel::new(a)).unwrap();
        let right = SharedChannel::from_split_with_config(
            IoChannel::new(b),
            ChannelConfig::with_max_length(64),
        )
        .unwrap();

        left.send(&(3u16, "split")).unwrap();
        assert_eq!(right.receive::<(u16, String)>().unwrap(), (3, "split".into()));
        assert_eq!(right.config().max_length, Some(64));
    }

    #[test]
    fn into_parts_returns_the_halves() {
        let (left, _right) = connected_pair();
        let (_reader, writer) = left.into_parts().unwrap();
        assert_eq!(writer.pending(), 0);
    }
}
