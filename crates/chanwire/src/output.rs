use std::io::{IsTerminal, Write};

use chanwire_codec::{Shape, Value};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::json::value_to_json;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    shape: String,
    length: usize,
    hex: &'a str,
}

pub fn print_encoded(shape: &Shape, wire: &[u8], format: OutputFormat) {
    let hex = hex::encode(wire);
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                shape: shape.to_string(),
                length: wire.len(),
                hex: &hex,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SHAPE", "LENGTH", "HEX"])
                .add_row(vec![shape.to_string(), wire.len().to_string(), hex]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{hex}"),
        OutputFormat::Raw => print_raw(wire),
    }
}

#[derive(Serialize)]
struct DecodedOutput {
    shape: String,
    consumed: usize,
    trailing: usize,
    value: serde_json::Value,
}

pub fn print_decoded(
    shape: &Shape,
    value: &Value,
    consumed: usize,
    trailing: usize,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = DecodedOutput {
                shape: shape.to_string(),
                consumed,
                trailing,
                value: value_to_json(value),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "KIND", "VALUE"]);
            for (index, field) in top_level_fields(value).iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    field.kind(),
                    value_to_json(field).to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "{}",
            serde_json::to_string_pretty(&value_to_json(value))
                .unwrap_or_else(|_| "null".to_string())
        ),
        OutputFormat::Raw => match value {
            Value::Bytes(raw) => print_raw(raw),
            Value::Str(text) => print_raw(text.as_bytes()),
            other => println!("{}", value_to_json(other)),
        },
    }
}

fn top_level_fields(value: &Value) -> Vec<&Value> {
    match value {
        Value::Tuple(fields) => fields.iter().collect(),
        other => vec![other],
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
