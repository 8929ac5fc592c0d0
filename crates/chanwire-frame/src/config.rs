/// Default bound on decoded length and count prefixes: 16 MiB.
pub const DEFAULT_MAX_LENGTH: u64 = 16 * 1024 * 1024;

/// Configuration for a [`SharedChannel`](crate::SharedChannel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Largest byte-string length or sequence count accepted while decoding
    /// inside a receive section. `None` disables the check.
    pub max_length: Option<u64>,
}

impl ChannelConfig {
    /// Accept any declared length, limited only by what the transport delivers.
    pub fn unbounded() -> Self {
        Self { max_length: None }
    }

    /// Bound decoded lengths and counts to `max_length`.
    pub fn with_max_length(max_length: u64) -> Self {
        Self {
            max_length: Some(max_length),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_length: Some(DEFAULT_MAX_LENGTH),
        }
    }
}
