use std::fmt;
use std::io;

use chanwire_codec::CodecError;
use chanwire_transport::ChannelError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    match err {
        ChannelError::Io(source) => io_error(context, source),
        // Input buffers are finite: running out means the input was truncated.
        ChannelError::Closed | ChannelError::ShortRead { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: input truncated ({err})"))
        }
        ChannelError::Poisoned(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    match err {
        CodecError::Channel(err) => channel_error(context, err),
        CodecError::InvalidShape { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        CodecError::LengthExceeded { .. }
        | CodecError::InvalidUtf8(_)
        | CodecError::ShapeMismatch(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_input_is_data_invalid() {
        let err = codec_error(
            "decode",
            CodecError::Channel(ChannelError::ShortRead {
                expected: 4,
                got: 1,
            }),
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("truncated"));
    }

    #[test]
    fn bad_shape_is_usage() {
        let err = codec_error(
            "shape",
            CodecError::InvalidShape {
                input: "(u8".into(),
                reason: "unclosed tuple".into(),
            },
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn missing_file_is_failure() {
        let err = io_error("read", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, FAILURE);
        assert!(err.message.starts_with("read: "));
    }
}
