//! Type-directed binary codec over chanwire byte channels.
//!
//! Every supported shape has a fixed encoding:
//! - fixed-width integers: big-endian, width from the static type
//! - `bool`: one byte, `0x00`/`0x01`; any nonzero byte decodes as `true`
//! - byte strings: 8-byte big-endian length, then the raw bytes
//! - sequences: 8-byte big-endian count, then each element
//! - tuples: each field in declared order, no separators
//!
//! There are no magic numbers, version bytes, or type tags. Both ends must
//! agree on the exact sequence of types out of band.
//!
//! The codec never touches the framing locks; it only reads, appends, and
//! flushes through [`ReadChannel`] and [`WriteChannel`].

pub mod compose;
pub mod dynamic;
pub mod error;
pub mod primitive;
pub mod seq;
pub mod string;
pub mod traits;
pub mod tuple;

pub use chanwire_transport::{ReadChannel, WriteChannel};
pub use compose::{decode_from_slice, deserialize_seq, encode_to_bytes, serialize_seq};
pub use dynamic::{Shape, Value};
pub use error::{CodecError, Result};
pub use traits::{
    check_zero_width_count, decode_len, encode_len, Decode, DecodeInPlace, Encode,
    MAX_ZERO_WIDTH_COUNT,
};
