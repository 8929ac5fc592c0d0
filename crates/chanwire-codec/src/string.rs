//! Byte strings: an 8-byte big-endian length followed by the raw bytes.
//!
//! [`Bytes`] is the native byte-string type and is read in one exact-size
//! read. `String` shares the wire format and is checked for UTF-8 on decode.
//! `Vec<u8>` produces the same bytes through the generic sequence rule and
//! is read in bounded bulk chunks.

use bytes::Bytes;
use chanwire_transport::{ReadChannel, WriteChannel};

use crate::error::Result;
use crate::traits::{decode_len, encode_len, Decode, Encode};

fn encode_raw(raw: &[u8], ch: &mut dyn WriteChannel) -> Result<()> {
    encode_len(raw.len(), ch)?;
    ch.append(raw)?;
    Ok(())
}

impl Encode for Bytes {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        encode_raw(self, ch)
    }
}

impl Decode for Bytes {
    fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
        let len = decode_len(ch)?;
        Ok(ch.read_bytes(len)?)
    }
}

impl Encode for str {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        encode_raw(self.as_bytes(), ch)
    }
}

impl Encode for String {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        encode_raw(self.as_bytes(), ch)
    }
}

impl Decode for String {
    fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
        let raw = Bytes::decode(ch)?;
        Ok(String::from_utf8(Vec::from(raw))?)
    }
}
