use std::path::PathBuf;

use chanwire_codec::Shape;
use clap::{Args, Subcommand};

use crate::exit::{codec_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a JSON value as the wire bytes of a shape.
    Encode(EncodeArgs),
    /// Decode wire bytes of a shape and print the value.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Parse a shape argument such as `(u8, [str])`.
pub fn parse_shape(text: &str) -> CliResult<Shape> {
    text.parse().map_err(|err| codec_error("shape", err))
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Shape of the value, e.g. `(u32, [str], bytes)`.
    pub shape: String,
    /// JSON value. Byte strings are given as hex strings.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub json: Option<String>,
    /// Read the JSON value from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Shape of the encoded value.
    pub shape: String,
    /// Encoded bytes as hex. Whitespace and a leading `0x` are ignored.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read raw encoded bytes from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Largest accepted length or count prefix.
    #[arg(long, value_name = "BYTES", env = "CHANWIRE_MAX_LENGTH", conflicts_with = "unbounded")]
    pub max_length: Option<u64>,
    /// Accept any length prefix the input can satisfy.
    #[arg(long)]
    pub unbounded: bool,
    /// Succeed even when bytes remain after the value.
    #[arg(long)]
    pub allow_trailing: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
