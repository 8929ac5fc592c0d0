/// Errors reported by a byte channel.
///
/// This is the only failure a channel can surface: the underlying transport
/// could not complete a read, append, or flush.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// An I/O error occurred on the underlying stream.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the channel before the operation completed.
    #[error("channel closed")]
    Closed,

    /// Fewer bytes were available than an exact read required.
    #[error("short read ({got} of {expected} bytes available)")]
    ShortRead { expected: usize, got: usize },

    /// A thread panicked while holding one of the channel's locks.
    #[error("channel {0} lock poisoned")]
    Poisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
