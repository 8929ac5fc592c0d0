//! Byte channel contract for chanwire.
//!
//! A channel is an ordered, bidirectional byte stream with three operations:
//! exact-size read, append, and flush. Everything above this crate (the
//! framing locks and the value codec) talks to a transport only through
//! [`ReadChannel`] and [`WriteChannel`].
//!
//! Concrete transports live outside this crate. Two adapters are provided:
//! - [`IoChannel`] over any `std::io::Read + Write` stream
//! - [`MemoryChannel`] and [`pipe`] for in-process use

pub mod error;
pub mod io;
pub mod memory;
pub mod pipe;
pub mod traits;

pub use error::{ChannelError, Result};
pub use io::{IoChannel, TryCloneStream};
pub use memory::MemoryChannel;
pub use pipe::{pipe, PipeEnd, PipeReader, PipeWriter};
pub use traits::{ByteChannel, ReadChannel, SplitChannel, WriteChannel};
