//! Fixed-width integers, booleans, and the unit value.

use chanwire_transport::{ReadChannel, WriteChannel};

use crate::error::Result;
use crate::traits::{Decode, Encode};

macro_rules! int_codec {
    ($($ty:ty),+ $(,)?) => {$(
        impl Encode for $ty {
            fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
                ch.append(&self.to_be_bytes())?;
                Ok(())
            }
        }

        impl Decode for $ty {
            fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                ch.read_exact(&mut buf)?;
                Ok(<$ty>::from_be_bytes(buf))
            }
        }
    )+};
}

int_codec!(u16, u32, u64, i8, i16, i32, i64);

/// Largest single read when decoding a run of raw bytes.
const BULK_CHUNK: usize = 64 * 1024;

impl Encode for u8 {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        ch.append(&[*self])?;
        Ok(())
    }
}

impl Decode for u8 {
    fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
        let mut buf = [0u8; 1];
        ch.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// `Vec<u8>` is wire-identical to a byte string, so read it in bulk.
    /// The buffer grows one chunk at a time with the data actually received.
    fn decode_vec(count: usize, ch: &mut dyn ReadChannel) -> Result<Vec<Self>> {
        let mut out = Vec::with_capacity(count.min(BULK_CHUNK));
        while out.len() < count {
            let start = out.len();
            let chunk = (count - start).min(BULK_CHUNK);
            out.reserve_exact(chunk);
            out.resize(start + chunk, 0);
            ch.read_exact(&mut out[start..])?;
        }
        Ok(out)
    }
}

impl Encode for bool {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        ch.append(&[u8::from(*self)])?;
        Ok(())
    }
}

/// Any nonzero byte decodes to `true`.
impl Decode for bool {
    fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
        let mut buf = [0u8; 1];
        ch.read_exact(&mut buf)?;
        Ok(buf[0] != 0)
    }
}

impl Encode for () {
    fn encode(&self, _ch: &mut dyn WriteChannel) -> Result<()> {
        Ok(())
    }
}

impl Decode for () {
    const ZERO_WIDTH: bool = true;

    fn decode(_ch: &mut dyn ReadChannel) -> Result<Self> {
        Ok(())
    }
}

/// Implement [`Encode`](crate::Encode) and [`Decode`](crate::Decode) for a
/// C-like enum through its integer representation.
///
/// The enum must be `Copy`, and the representation must convert both ways:
/// `$repr: From<$ty>` and `$ty: From<$repr>`. Decoding never fails on an
/// unknown discriminant; mapping those is up to the `From` impl (typically
/// an `Unknown(repr)` variant).
///
/// ```
/// use chanwire_codec::{decode_from_slice, encode_to_bytes, impl_enum_codec};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Opcode {
///     Call,
///     Return,
///     Unknown(u8),
/// }
///
/// impl From<Opcode> for u8 {
///     fn from(op: Opcode) -> u8 {
///         match op {
///             Opcode::Call => 1,
///             Opcode::Return => 2,
///             Opcode::Unknown(raw) => raw,
///         }
///     }
/// }
///
/// impl From<u8> for Opcode {
///     fn from(raw: u8) -> Opcode {
///         match raw {
///             1 => Opcode::Call,
///             2 => Opcode::Return,
///             other => Opcode::Unknown(other),
///         }
///     }
/// }
///
/// impl_enum_codec!(Opcode as u8);
///
/// let wire = encode_to_bytes(&Opcode::Return).unwrap();
/// assert_eq!(wire.as_ref(), &[2]);
/// assert_eq!(decode_from_slice::<Opcode>(&[9]).unwrap(), Opcode::Unknown(9));
/// ```
#[macro_export]
macro_rules! impl_enum_codec {
    ($ty:ty as $repr:ty) => {
        impl $crate::Encode for $ty {
            fn encode(&self, ch: &mut dyn $crate::WriteChannel) -> $crate::Result<()> {
                <$repr as $crate::Encode>::encode(&<$repr>::from(*self), ch)
            }
        }

        impl $crate::Decode for $ty {
            fn decode(ch: &mut dyn $crate::ReadChannel) -> $crate::Result<Self> {
                <$repr as $crate::Decode>::decode(ch).map(<$ty>::from)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use chanwire_transport::MemoryChannel;

    use super::*;

    fn wire<T: Encode>(value: T) -> Vec<u8> {
        let mut ch = MemoryChannel::new();
        value.encode(&mut ch).unwrap();
        ch.as_bytes().to_vec()
    }

    fn roundtrip<T: Encode + Decode>(value: &T) -> T {
        let mut ch = MemoryChannel::new();
        value.encode(&mut ch).unwrap();
        let out = T::decode(&mut ch).unwrap();
        assert!(ch.is_empty(), "decoder left bytes behind");
        out
    }

    #[test]
    fn integers_are_big_endian() {
        assert_eq!(wire(0x01020304u32), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(wire(0x0102u16), [0x01, 0x02]);
        assert_eq!(wire(-2i16), [0xFF, 0xFE]);
        assert_eq!(wire(1u64), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(wire(0x7Fu8), [0x7F]);
    }

    #[test]
    fn integer_extremes_roundtrip() {
        assert_eq!(roundtrip(&u8::MAX), u8::MAX);
        assert_eq!(roundtrip(&i8::MIN), i8::MIN);
        assert_eq!(roundtrip(&u16::MAX), u16::MAX);
        assert_eq!(roundtrip(&i16::MIN), i16::MIN);
        assert_eq!(roundtrip(&u32::MAX), u32::MAX);
        assert_eq!(roundtrip(&i32::MIN), i32::MIN);
        assert_eq!(roundtrip(&u64::MAX), u64::MAX);
        assert_eq!(roundtrip(&i64::MIN), i64::MIN);
        assert_eq!(roundtrip(&i64::MAX), i64::MAX);
        assert_eq!(roundtrip(&0i32), 0);
    }

    #[test]
    fn booleans_are_single_bytes() {
        assert_eq!(wire(false), [0x00]);
        assert_eq!(wire(true), [0x01]);
    }

    #[test]
    fn any_nonzero_byte_is_true() {
        for raw in [0x01u8, 0x02, 0x80, 0xFF] {
            let mut ch = MemoryChannel::from_bytes([raw]);
            assert!(bool::decode(&mut ch).unwrap());
        }
        let mut ch = MemoryChannel::from_bytes([0u8]);
        assert!(!bool::decode(&mut ch).unwrap());
    }

    #[test]
    fn unit_writes_nothing() {
        assert!(wire(()).is_empty());
    }

    #[test]
    fn truncated_integer_fails() {
        let mut ch = MemoryChannel::from_bytes([0x01u8, 0x02, 0x03]);
        let err = u32::decode(&mut ch).unwrap_err();
        assert!(err.as_channel().is_some());
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Green,
        Other(u16),
    }

    impl From<Color> for u16 {
        fn from(color: Color) -> u16 {
            match color {
                Color::Red => 0x0100,
                Color::Green => 0x0200,
                Color::Other(raw) => raw,
            }
        }
    }

    impl From<u16> for Color {
        fn from(raw: u16) -> Color {
            match raw {
                0x0100 => Color::Red,
                0x0200 => Color::Green,
                other => Color::Other(other),
            }
        }
    }

    impl_enum_codec!(Color as u16);

    #[test]
    fn enums_use_their_integer_representation() {
        assert_eq!(wire(Color::Green), [0x02, 0x00]);
        assert_eq!(roundtrip(&Color::Red), Color::Red);
        assert_eq!(roundtrip(&Color::Other(7)), Color::Other(7));
    }
}
