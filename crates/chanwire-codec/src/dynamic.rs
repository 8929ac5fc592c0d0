//! Run-time shape descriptions and values.
//!
//! The wire carries no type information, so tooling that does not know the
//! message types at compile time describes them with a [`Shape`] instead.
//! Shapes have a compact text form:
//!
//! ```text
//! u8 u16 u32 u64 i8 i16 i32 i64 bool bytes str
//! [shape]                 sequence of shape
//! (shape, shape, ...)     tuple; () is the empty tuple
//! ```
//!
//! A [`Value`] encodes to exactly the bytes the equivalent static type would.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chanwire_transport::{ReadChannel, WriteChannel};

use crate::error::{CodecError, Result};
use crate::traits::{check_zero_width_count, decode_len, Decode, Encode, MAX_PREALLOC};

/// The static shape of an encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Bool,
    /// Raw byte string.
    Bytes,
    /// UTF-8 string; same wire format as [`Shape::Bytes`].
    Str,
    Seq(Box<Shape>),
    Tuple(Vec<Shape>),
}

/// A decoded value paired with no type information of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Bool(bool),
    Bytes(Bytes),
    Str(String),
    Seq(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Shape {
    /// Values of this shape encode to zero bytes.
    pub fn is_zero_width(&self) -> bool {
        match self {
            Shape::Tuple(fields) => fields.iter().all(Shape::is_zero_width),
            _ => false,
        }
    }

    /// Decode one value of this shape.
    pub fn decode_value(&self, ch: &mut dyn ReadChannel) -> Result<Value> {
        Ok(match self {
            Shape::U8 => Value::U8(u8::decode(ch)?),
            Shape::U16 => Value::U16(u16::decode(ch)?),
            Shape::U32 => Value::U32(u32::decode(ch)?),
            Shape::U64 => Value::U64(u64::decode(ch)?),
            Shape::I8 => Value::I8(i8::decode(ch)?),
            Shape::I16 => Value::I16(i16::decode(ch)?),
            Shape::I32 => Value::I32(i32::decode(ch)?),
            Shape::I64 => Value::I64(i64::decode(ch)?),
            Shape::Bool => Value::Bool(bool::decode(ch)?),
            Shape::Bytes => Value::Bytes(Bytes::decode(ch)?),
            Shape::Str => Value::Str(String::decode(ch)?),
            Shape::Seq(element) => {
                let count = decode_len(ch)?;
                if element.is_zero_width() {
                    check_zero_width_count(count)?;
                }
                let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
                for _ in 0..count {
                    items.push(element.decode_value(ch)?);
                }
                Value::Seq(items)
            }
            Shape::Tuple(fields) => Value::Tuple(
                fields
                    .iter()
                    .map(|field| field.decode_value(ch))
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }

    /// Encode `value` after checking that it has this shape.
    ///
    /// Nothing is written if the check fails.
    pub fn encode_value(&self, value: &Value, ch: &mut dyn WriteChannel) -> Result<()> {
        self.check(value)?;
        value.encode(ch)
    }

    /// Verify that `value` has this shape, recursively.
    pub fn check(&self, value: &Value) -> Result<()> {
        let matches = match (self, value) {
            (Shape::U8, Value::U8(_))
            | (Shape::U16, Value::U16(_))
            | (Shape::U32, Value::U32(_))
            | (Shape::U64, Value::U64(_))
            | (Shape::I8, Value::I8(_))
            | (Shape::I16, Value::I16(_))
            | (Shape::I32, Value::I32(_))
            | (Shape::I64, Value::I64(_))
            | (Shape::Bool, Value::Bool(_))
            | (Shape::Bytes, Value::Bytes(_))
            | (Shape::Str, Value::Str(_)) => true,
            (Shape::Seq(element), Value::Seq(items)) => {
                for item in items {
                    element.check(item)?;
                }
                true
            }
            (Shape::Tuple(fields), Value::Tuple(items)) if fields.len() == items.len() => {
                for (field, item) in fields.iter().zip(items) {
                    field.check(item)?;
                }
                true
            }
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(CodecError::ShapeMismatch(format!(
                "expected {self}, found {}",
                value.kind()
            )))
        }
    }
}

impl Value {
    /// Short description of the value's outer shape, for diagnostics.
    pub fn kind(&self) -> String {
        match self {
            Value::U8(_) => "u8".into(),
            Value::U16(_) => "u16".into(),
            Value::U32(_) => "u32".into(),
            Value::U64(_) => "u64".into(),
            Value::I8(_) => "i8".into(),
            Value::I16(_) => "i16".into(),
            Value::I32(_) => "i32".into(),
            Value::I64(_) => "i64".into(),
            Value::Bool(_) => "bool".into(),
            Value::Bytes(_) => "bytes".into(),
            Value::Str(_) => "str".into(),
            Value::Seq(items) => format!("sequence of {} items", items.len()),
            Value::Tuple(items) => format!("tuple of {} fields", items.len()),
        }
    }
}

impl Encode for Value {
    fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
        match self {
            Value::U8(v) => v.encode(ch),
            Value::U16(v) => v.encode(ch),
            Value::U32(v) => v.encode(ch),
            Value::U64(v) => v.encode(ch),
            Value::I8(v) => v.encode(ch),
            Value::I16(v) => v.encode(ch),
            Value::I32(v) => v.encode(ch),
            Value::I64(v) => v.encode(ch),
            Value::Bool(v) => v.encode(ch),
            Value::Bytes(v) => v.encode(ch),
            Value::Str(v) => v.encode(ch),
            Value::Seq(items) => items.encode(ch),
            Value::Tuple(items) => {
                for item in items {
                    item.encode(ch)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::U8 => f.write_str("u8"),
            Shape::U16 => f.write_str("u16"),
            Shape::U32 => f.write_str("u32"),
            Shape::U64 => f.write_str("u64"),
            Shape::I8 => f.write_str("i8"),
            Shape::I16 => f.write_str("i16"),
            Shape::I32 => f.write_str("i32"),
            Shape::I64 => f.write_str("i64"),
            Shape::Bool => f.write_str("bool"),
            Shape::Bytes => f.write_str("bytes"),
            Shape::Str => f.write_str("str"),
            Shape::Seq(element) => write!(f, "[{element}]"),
            Shape::Tuple(fields) => {
                f.write_str("(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for Shape {
    type Err = CodecError;

    fn from_str(input: &str) -> Result<Self> {
        let mut parser = ShapeParser {
            input,
            pos: 0,
            depth: 0,
        };
        let shape = parser.shape()?;
        parser.skip_ws();
        if parser.pos != input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(shape)
    }
}

/// Deepest nesting of sequences and tuples accepted in shape text.
pub const MAX_SHAPE_DEPTH: usize = 128;

struct ShapeParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl ShapeParser<'_> {
    fn shape(&mut self) -> Result<Shape> {
        self.skip_ws();
        if matches!(self.peek(), Some('[' | '(')) {
            if self.depth == MAX_SHAPE_DEPTH {
                return Err(self.error("nesting too deep"));
            }
            self.depth += 1;
            let shape = self.compound();
            self.depth -= 1;
            return shape;
        }
        match self.peek() {
            Some(c) if c.is_ascii_alphanumeric() => self.primitive(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn compound(&mut self) -> Result<Shape> {
        match self.peek() {
            Some('[') => {
                self.pos += 1;
                let element = self.shape()?;
                self.expect(']')?;
                Ok(Shape::Seq(Box::new(element)))
            }
            Some('(') => {
                self.pos += 1;
                let mut fields = Vec::new();
                loop {
                    self.skip_ws();
                    if self.peek() == Some(')') {
                        self.pos += 1;
                        return Ok(Shape::Tuple(fields));
                    }
                    fields.push(self.shape()?);
                    self.skip_ws();
                    match self.peek() {
                        Some(',') => self.pos += 1,
                        Some(')') => {}
                        _ => return Err(self.error("expected ',' or ')'")),
                    }
                }
            }
            _ => Err(self.error("expected '[' or '('")),
        }
    }

    fn primitive(&mut self) -> Result<Shape> {
        let rest = &self.input[self.pos..];
        let len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let shape = match &rest[..len] {
            "u8" => Shape::U8,
            "u16" => Shape::U16,
            "u32" => Shape::U32,
            "u64" => Shape::U64,
            "i8" => Shape::I8,
            "i16" => Shape::I16,
            "i32" => Shape::I32,
            "i64" => Shape::I64,
            "bool" => Shape::Bool,
            "bytes" => Shape::Bytes,
            "str" => Shape::Str,
            _ => return Err(self.error("unknown primitive")),
        };
        self.pos += len;
        Ok(shape)
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_ws();
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{want}'")))
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, reason: &str) -> CodecError {
        CodecError::InvalidShape {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use chanwire_transport::MemoryChannel;

    use super::*;
    use crate::compose::encode_to_bytes;
    use crate::traits::MAX_ZERO_WIDTH_COUNT;

    fn shape(text: &str) -> Shape {
        text.parse().unwrap()
    }

    #[test]
    fn parses_nested_shapes() {
        assert_eq!(
            shape("( u8 , [ (bool, bytes) ], str )"),
            Shape::Tuple(vec![
                Shape::U8,
                Shape::Seq(Box::new(Shape::Tuple(vec![Shape::Bool, Shape::Bytes]))),
                Shape::Str,
            ])
        );
        assert_eq!(shape("()"), Shape::Tuple(vec![]));
        assert_eq!(shape("(u8,)"), Shape::Tuple(vec![Shape::U8]));
    }

    #[test]
    fn display_parses_back() {
        for text in ["u64", "[i16]", "(u8, [(bool, bytes)], str)", "[[str]]", "()"] {
            assert_eq!(shape(text).to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed_shapes() {
        let deep = "[".repeat(MAX_SHAPE_DEPTH + 1) + "u8" + &"]".repeat(MAX_SHAPE_DEPTH + 1);
        let malformed = ["", "u128", "[u8", "(u8 bool)", "u8 u8", "{u8}", "(u8,,)", deep.as_str()];
        for text in malformed {
            let err = text.parse::<Shape>().unwrap_err();
            assert!(
                matches!(err, CodecError::InvalidShape { .. }),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn rejects_shapes_nested_too_deeply() {
        let depth = MAX_SHAPE_DEPTH;
        let ok = "[".repeat(depth) + "u8" + &"]".repeat(depth);
        assert!(ok.parse::<Shape>().is_ok());

        let deep = "[".repeat(depth + 1) + "u8" + &"]".repeat(depth + 1);
        let err = deep.parse::<Shape>().unwrap_err();
        assert!(matches!(
            &err,
            CodecError::InvalidShape { reason, .. } if reason.starts_with("nesting too deep")
        ));

        // Far past any recursion the parser could survive.
        let hostile = "(".repeat(60_000) + &")".repeat(60_000);
        assert!(matches!(
            hostile.parse::<Shape>(),
            Err(CodecError::InvalidShape { .. })
        ));
    }

    #[test]
    fn zero_width_sequences_are_capped() {
        assert!(shape("()").is_zero_width());
        assert!(shape("((), (()))").is_zero_width());
        assert!(!shape("[()]").is_zero_width());
        assert!(!shape("((), u8)").is_zero_width());

        let mut ch = MemoryChannel::from_bytes((16u64 << 20).to_be_bytes());
        let err = shape("[()]").decode_value(&mut ch).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthExceeded { len, max: MAX_ZERO_WIDTH_COUNT } if len == 16 << 20
        ));

        let mut ch = MemoryChannel::from_bytes(3u64.to_be_bytes());
        assert_eq!(
            shape("[()]").decode_value(&mut ch).unwrap(),
            Value::Seq(vec![Value::Tuple(vec![]); 3])
        );
    }

    #[test]
    fn values_encode_like_static_types() {
        let value = Value::Tuple(vec![
            Value::U8(7),
            Value::Bool(true),
            Value::Seq(vec![Value::Str("ab".into())]),
        ]);
        let dynamic = encode_to_bytes(&value).unwrap();
        let fixed = encode_to_bytes(&(7u8, true, vec![String::from("ab")])).unwrap();
        assert_eq!(dynamic, fixed);
    }

    #[test]
    fn decode_value_follows_shape() {
        let wire = encode_to_bytes(&(-3i32, vec![1u16, 2], Bytes::from_static(b"\x01"))).unwrap();
        let mut ch = MemoryChannel::from_bytes(&wire);
        let value = shape("(i32, [u16], bytes)").decode_value(&mut ch).unwrap();
        assert_eq!(
            value,
            Value::Tuple(vec![
                Value::I32(-3),
                Value::Seq(vec![Value::U16(1), Value::U16(2)]),
                Value::Bytes(Bytes::from_static(b"\x01")),
            ])
        );
        assert!(ch.is_empty());
    }

    #[test]
    fn encode_value_checks_before_writing() {
        let mut ch = MemoryChannel::new();
        let err = shape("(u8, bool)")
            .encode_value(&Value::Tuple(vec![Value::U8(1), Value::U8(0)]), &mut ch)
            .unwrap_err();
        assert!(matches!(err, CodecError::ShapeMismatch(_)));
        assert!(ch.is_empty());

        let err = shape("[u8]")
            .encode_value(&Value::Seq(vec![Value::U8(1), Value::I8(1)]), &mut ch)
            .unwrap_err();
        assert!(matches!(err, CodecError::ShapeMismatch(_)));
    }

    #[test]
    fn empty_sequence_conforms_to_any_element_shape() {
        let empty = Value::Seq(vec![]);
        shape("[[(u8, str)]]").check(&empty).unwrap();
        assert_eq!(encode_to_bytes(&empty).unwrap().as_ref(), &[0u8; 8]);
    }
}
