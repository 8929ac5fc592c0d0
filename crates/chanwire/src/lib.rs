//! Typed binary messages over shared byte channels.
//!
//! chanwire moves statically typed values across an ordered byte stream with
//! a fixed, tag-free binary encoding, and keeps concurrent senders and
//! receivers from interleaving their messages.
//!
//! # Crate Structure
//!
//! - [`transport`]: the byte channel contract plus stream, memory and pipe adapters
//! - [`frame`]: per-direction framing locks over a shared channel
//! - [`codec`]: encode/decode rules, composition helpers and dynamic shapes
//!
//! ```
//! use chanwire::frame::SharedChannel;
//! use chanwire::transport::pipe;
//!
//! let (a, b) = pipe();
//! let client = SharedChannel::from_split(a).unwrap();
//! let server = SharedChannel::from_split(b).unwrap();
//!
//! client.send(&(1u32, String::from("ping"))).unwrap();
//! let (id, body): (u32, String) = server.receive().unwrap();
//! assert_eq!((id, body.as_str()), (1, "ping"));
//! ```

/// Re-export transport types.
pub mod transport {
    pub use chanwire_transport::*;
}

/// Re-export framing types.
pub mod frame {
    pub use chanwire_frame::*;
}

/// Re-export codec types and macros.
pub mod codec {
    pub use chanwire_codec::*;
}

pub use chanwire_codec::{deserialize_seq, impl_enum_codec, serialize_seq};
