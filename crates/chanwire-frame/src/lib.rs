//! Message framing for channels shared between threads.
//!
//! A [`SharedChannel`] holds one lock per direction:
//! - the write lock brackets one outgoing logical message
//! - the read lock brackets one incoming logical message
//!
//! The two are independent, so a thread may receive while another sends.
//! Sections are scoped: the guards returned by `begin_send` and
//! `begin_receive` release their lock when dropped.

pub mod config;
pub mod shared;

pub use config::{ChannelConfig, DEFAULT_MAX_LENGTH};
pub use shared::{ReceiveGuard, SendGuard, SharedChannel};
