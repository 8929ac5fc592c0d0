//! Homogeneous sequences: an 8-byte big-endian count, then each element.

use chanwire_transport::{ReadChannel, WriteChannel};

use crate::error::{CodecError, Result};
use crate::traits::{decode_len, encode_len, Decode, Encode};

impl<T: Encode> Encode for [T] {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        encode_len(self.len(), ch)?;
        for element in self {
            element.encode(ch)?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        self.as_slice().encode(ch)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
        let count = decode_len(ch)?;
        T::decode_vec(count, ch)
    }
}

/// Arrays travel as ordinary sequences, count prefix included.
impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        self.as_slice().encode(ch)
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
        let count = decode_len(ch)?;
        if count != N {
            return Err(CodecError::ShapeMismatch(format!(
                "expected {N} elements, found {count}"
            )));
        }
        let elements = T::decode_vec(count, ch)?;
        elements.try_into().map_err(|rest: Vec<T>| {
            CodecError::ShapeMismatch(format!("expected {N} elements, found {}", rest.len()))
        })
    }
}
