use chanwire_transport::ChannelError;

/// Errors that can occur while encoding or decoding values.
///
/// Statically typed codecs over byte-oriented shapes only ever fail with
/// [`CodecError::Channel`] or, when the channel carries a length bound,
/// [`CodecError::LengthExceeded`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The channel failed to read, append, or flush.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// A length or count prefix exceeds the channel's configured bound.
    #[error("declared length {len} exceeds limit {max}")]
    LengthExceeded { len: u64, max: u64 },

    /// A string payload is not valid UTF-8.
    #[error("string payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A value does not have the shape the codec was asked to use.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A textual shape description could not be parsed.
    #[error("invalid shape {input:?}: {reason}")]
    InvalidShape { input: String, reason: String },
}

impl CodecError {
    /// The underlying channel error, if that is what this is.
    pub fn as_channel(&self) -> Option<&ChannelError> {
        match self {
            CodecError::Channel(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
