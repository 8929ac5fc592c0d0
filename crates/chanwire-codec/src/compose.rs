//! Fail-fast composition of several values into one message.

use bytes::Bytes;
use chanwire_transport::{MemoryChannel, ReadChannel, WriteChannel};

use crate::error::{CodecError, Result};
use crate::traits::{Decode, DecodeInPlace, Encode};

/// Encode each argument in order, stopping at the first error.
///
/// Arguments after a failing one are not touched. An empty list writes
/// nothing and succeeds. See [`serialize_seq!`](crate::serialize_seq!) for
/// the variadic form.
pub fn serialize_seq(ch: &mut dyn WriteChannel, args: &[&dyn Encode]) -> Result<()> {
    for arg in args {
        arg.encode(ch)?;
    }
    Ok(())
}

/// Decode into each destination in order, stopping at the first error.
///
/// Destinations before the failing one hold their decoded values;
/// the failing one and everything after it are left as they were.
pub fn deserialize_seq(
    ch: &mut dyn ReadChannel,
    args: &mut [&mut dyn DecodeInPlace],
) -> Result<()> {
    for arg in args.iter_mut() {
        arg.decode_in_place(ch)?;
    }
    Ok(())
}

/// Encode a variadic list of values onto a channel, left to right.
///
/// ```
/// use chanwire_codec::serialize_seq;
/// use chanwire_transport::MemoryChannel;
///
/// let mut ch = MemoryChannel::new();
/// serialize_seq!(&mut ch, 7u8, true).unwrap();
/// assert_eq!(ch.as_bytes(), &[0x07, 0x01]);
/// ```
#[macro_export]
macro_rules! serialize_seq {
    ($ch:expr $(, $arg:expr)* $(,)?) => {
        $crate::serialize_seq($ch, &[$(&$arg as &dyn $crate::Encode),*])
    };
}

/// Decode a variadic list of places from a channel, left to right.
///
/// ```
/// use chanwire_codec::deserialize_seq;
/// use chanwire_transport::MemoryChannel;
///
/// let mut ch = MemoryChannel::from_bytes([0x07u8, 0x01]);
/// let (mut op, mut flag) = (0u8, false);
/// deserialize_seq!(&mut ch, op, flag).unwrap();
/// assert_eq!((op, flag), (7, true));
/// ```
#[macro_export]
macro_rules! deserialize_seq {
    ($ch:expr $(, $arg:expr)* $(,)?) => {
        $crate::deserialize_seq($ch, &mut [$(&mut $arg as &mut dyn $crate::DecodeInPlace),*])
    };
}

/// Encode a value into a standalone buffer.
pub fn encode_to_bytes<T: Encode + ?Sized>(value: &T) -> Result<Bytes> {
    let mut ch = MemoryChannel::new();
    value.encode(&mut ch)?;
    Ok(ch.into_bytes())
}

/// Decode a value that must occupy all of `bytes`.
///
/// Unbounded: length prefixes are limited only by the data present.
pub fn decode_from_slice<T: Decode>(bytes: &[u8]) -> Result<T> {
    let mut ch = MemoryChannel::from_bytes(bytes);
    let value = T::decode(&mut ch)?;
    if !ch.is_empty() {
        return Err(CodecError::ShapeMismatch(format!(
            "{} trailing bytes after value",
            ch.len()
        )));
    }
    Ok(value)
}
