use chanwire_codec::encode_to_bytes;
use tracing::debug;

use crate::cmd::{parse_shape, EncodeArgs};
use crate::exit::{codec_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::json::value_from_json;
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let shape = parse_shape(&args.shape)?;

    let text = match (&args.json, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("read {}", path.display()), err))?,
        (None, None) => return Err(CliError::new(DATA_INVALID, "no JSON value given")),
    };

    let json: serde_json::Value = serde_json::from_str(&text)
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid JSON: {err}")))?;
    let value = value_from_json(&shape, &json).map_err(|msg| CliError::new(DATA_INVALID, msg))?;

    let wire = encode_to_bytes(&value).map_err(|err| codec_error("encode", err))?;
    debug!(shape = %shape, len = wire.len(), "encoded value");

    print_encoded(&shape, &wire, format);
    Ok(SUCCESS)
}
