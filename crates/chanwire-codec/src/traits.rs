use chanwire_transport::{ReadChannel, WriteChannel};
use tracing::warn;

use crate::error::{CodecError, Result};

/// Writes a value onto a channel using its shape's wire rule.
///
/// The wire carries no type tags: the reader must decode with the same
/// static shape the writer encoded with.
pub trait Encode {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()>;
}

/// Upper bound on elements reserved up front when decoding a sequence. The
/// count prefix is untrusted, so larger sequences grow as elements arrive.
pub(crate) const MAX_PREALLOC: usize = 4096;

/// Largest count accepted for a sequence whose elements encode to zero
/// bytes. Such elements consume no input, so the channel's length bound
/// alone cannot stop a short prefix from demanding billions of them.
pub const MAX_ZERO_WIDTH_COUNT: u64 = 4096;

/// Reads a value of a fixed shape from a channel.
pub trait Decode: Sized {
    /// Every value of this type encodes to zero bytes.
    const ZERO_WIDTH: bool = false;

    fn decode(ch: &mut dyn ReadChannel) -> Result<Self>;

    /// Decode `count` consecutive values, as found after a sequence's count
    /// prefix. Types with a cheaper bulk read override this.
    fn decode_vec(count: usize, ch: &mut dyn ReadChannel) -> Result<Vec<Self>> {
        if Self::ZERO_WIDTH {
            check_zero_width_count(count)?;
        }
        let mut out = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            out.push(Self::decode(ch)?);
        }
        Ok(out)
    }
}

/// Reject a count of zero-width elements over [`MAX_ZERO_WIDTH_COUNT`].
pub fn check_zero_width_count(count: usize) -> Result<()> {
    let len = count as u64;
    if len > MAX_ZERO_WIDTH_COUNT {
        warn!(len, "zero-width sequence count over limit");
        return Err(CodecError::LengthExceeded {
            len,
            max: MAX_ZERO_WIDTH_COUNT,
        });
    }
    Ok(())
}

/// Decodes into an existing destination.
///
/// Object-safe counterpart of [`Decode`], used to fill a list of
/// caller-owned destinations in order. On failure the destination keeps its
/// previous value.
pub trait DecodeInPlace {
    fn decode_in_place(&mut self, ch: &mut dyn ReadChannel) -> Result<()>;
}

impl<T: Decode> DecodeInPlace for T {
    fn decode_in_place(&mut self, ch: &mut dyn ReadChannel) -> Result<()> {
        *self = T::decode(ch)?;
        Ok(())
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        (**self).encode(ch)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        (**self).encode(ch)
    }
}

impl<T: Decode> Decode for Box<T> {
    const ZERO_WIDTH: bool = T::ZERO_WIDTH;

    fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
        T::decode(ch).map(Box::new)
    }
}

/// Write a length or count prefix: 8 bytes, big-endian, unsigned.
pub fn encode_len(len: usize, ch: &mut dyn WriteChannel) -> Result<()> {
    ch.append(&(len as u64).to_be_bytes())?;
    Ok(())
}

/// Read a length or count prefix and check it against the channel's bound.
pub fn decode_len(ch: &mut dyn ReadChannel) -> Result<usize> {
    let mut buf = [0u8; 8];
    ch.read_exact(&mut buf)?;
    let len = u64::from_be_bytes(buf);

    if let Some(max) = ch.length_limit() {
        if len > max {
            warn!(len, max, "length prefix over channel limit");
            return Err(CodecError::LengthExceeded { len, max });
        }
    }

    usize::try_from(len).map_err(|_| CodecError::LengthExceeded {
        len,
        max: usize::MAX as u64,
    })
}
