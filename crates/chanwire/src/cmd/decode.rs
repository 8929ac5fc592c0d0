use std::io;

use chanwire_codec::Value;
use chanwire_frame::{ChannelConfig, SharedChannel};
use chanwire_transport::{IoChannel, MemoryChannel};
use tracing::{debug, warn};

use crate::cmd::{parse_shape, DecodeArgs};
use crate::exit::{
    channel_error, codec_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS,
};
use crate::output::{print_decoded, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let shape = parse_shape(&args.shape)?;
    let wire = read_input(&args)?;
    let total = wire.len();

    let config = if args.unbounded {
        ChannelConfig::unbounded()
    } else {
        args.max_length
            .map(ChannelConfig::with_max_length)
            .unwrap_or_default()
    };

    // Decoding goes through a receive section so the length bound applies.
    let channel = SharedChannel::with_config(
        MemoryChannel::from_bytes(&wire),
        IoChannel::new(io::sink()),
        config,
    );
    let value: Value = channel
        .with_receive(|ch| shape.decode_value(ch))
        .map_err(|err| codec_error("decode", err))?;
    let (rest, _) = channel
        .into_parts()
        .map_err(|err| channel_error("decode", err))?;

    let trailing = rest.len();
    let consumed = total - trailing;
    debug!(shape = %shape, consumed, trailing, "decoded value");

    if trailing > 0 {
        if !args.allow_trailing {
            return Err(CliError::new(
                DATA_INVALID,
                format!("{trailing} trailing bytes after {shape} value"),
            ));
        }
        warn!(trailing, "ignoring trailing bytes");
    }

    print_decoded(&shape, &value, consumed, trailing, format);
    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    match (&args.hex, &args.file) {
        (Some(text), _) => parse_hex(text),
        (None, Some(path)) => {
            std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err))
        }
        (None, None) => Err(CliError::new(DATA_INVALID, "no input bytes given")),
    }
}

fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex: {err}")))
}
