//! Self-describing tagged values.
//!
//! Open-ended property collections cannot rely on both ends knowing a
//! fixed schema, so every value is prefixed with a stable numeric tag
//! identifying which kind follows. The tag numbering is part of the wire
//! contract and must never be reordered.

use crate::error::{BinaryError, Result};
use crate::reader::BinaryReader;
use crate::writer::BinaryWriter;

const TAG_BYTE: i32 = 0;
const TAG_SHORT: i32 = 1;
const TAG_INT: i32 = 2;
const TAG_LONG: i32 = 3;
const TAG_FLOAT: i32 = 4;
const TAG_DOUBLE: i32 = 5;
const TAG_BOOL: i32 = 6;
const TAG_CHAR: i32 = 7;
const TAG_STRING: i32 = 8;
const TAG_ARRAY: i32 = 9;
const TAG_LIST: i32 = 10;
const TAG_MAP: i32 = 11;
const TAG_BYTE_ARRAY: i32 = 12;
const TAG_SHORT_ARRAY: i32 = 13;
const TAG_INT_ARRAY: i32 = 14;
const TAG_LONG_ARRAY: i32 = 15;
const TAG_FLOAT_ARRAY: i32 = 16;
const TAG_DOUBLE_ARRAY: i32 = 17;
const TAG_BOOL_ARRAY: i32 = 18;
const TAG_CHAR_ARRAY: i32 = 19;

/// A self-describing value.
///
/// The set of kinds is closed: the exhaustive match in `write_to` is the
/// compile-time guarantee that every representable value can be encoded.
/// Maps are ordered key/value pair lists because keys may be any value,
/// including kinds that cannot hash.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(char),
    String(String),
    Array(Vec<Value>),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    ByteArray(Vec<u8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    BoolArray(Vec<bool>),
    CharArray(Vec<char>),
}

impl Value {
    /// The wire tag for this value's kind.
    pub fn tag(&self) -> i32 {
        match self {
            Value::Byte(_) => TAG_BYTE,
            Value::Short(_) => TAG_SHORT,
            Value::Int(_) => TAG_INT,
            Value::Long(_) => TAG_LONG,
            Value::Float(_) => TAG_FLOAT,
            Value::Double(_) => TAG_DOUBLE,
            Value::Bool(_) => TAG_BOOL,
            Value::Char(_) => TAG_CHAR,
            Value::String(_) => TAG_STRING,
            Value::Array(_) => TAG_ARRAY,
            Value::List(_) => TAG_LIST,
            Value::Map(_) => TAG_MAP,
            Value::ByteArray(_) => TAG_BYTE_ARRAY,
            Value::ShortArray(_) => TAG_SHORT_ARRAY,
            Value::IntArray(_) => TAG_INT_ARRAY,
            Value::LongArray(_) => TAG_LONG_ARRAY,
            Value::FloatArray(_) => TAG_FLOAT_ARRAY,
            Value::DoubleArray(_) => TAG_DOUBLE_ARRAY,
            Value::BoolArray(_) => TAG_BOOL_ARRAY,
            Value::CharArray(_) => TAG_CHAR_ARRAY,
        }
    }

    /// Encode this value: the kind tag, then the payload, recursing into
    /// elements for the container kinds.
    pub fn write_to(&self, writer: &mut BinaryWriter) {
        writer.write_int(self.tag());
        match self {
            Value::Byte(v) => writer.write_byte(*v),
            Value::Short(v) => writer.write_short(*v),
            Value::Int(v) => writer.write_int(*v),
            Value::Long(v) => writer.write_long(*v),
            Value::Float(v) => writer.write_float(*v),
            Value::Double(v) => writer.write_double(*v),
            Value::Bool(v) => writer.write_bool(*v),
            Value::Char(v) => writer.write_char(*v),
            Value::String(v) => writer.write_string(v),
            Value::Array(items) | Value::List(items) => {
                writer.write_seq(items, |w, item| item.write_to(w));
            }
            Value::Map(entries) => {
                writer.write_seq(entries, |w, (key, value)| {
                    key.write_to(w);
                    value.write_to(w);
                });
            }
            Value::ByteArray(bytes) => writer.write_byte_array(bytes),
            Value::ShortArray(items) => writer.write_seq(items, |w, v| w.write_short(*v)),
            Value::IntArray(items) => writer.write_seq(items, |w, v| w.write_int(*v)),
            Value::LongArray(items) => writer.write_seq(items, |w, v| w.write_long(*v)),
            Value::FloatArray(items) => writer.write_seq(items, |w, v| w.write_float(*v)),
            Value::DoubleArray(items) => writer.write_seq(items, |w, v| w.write_double(*v)),
            Value::BoolArray(items) => writer.write_seq(items, |w, v| w.write_bool(*v)),
            Value::CharArray(items) => writer.write_seq(items, |w, v| w.write_char(*v)),
        }
    }

    /// Decode one tagged value.
    pub fn read_from(reader: &mut BinaryReader) -> Result<Value> {
        let tag = reader.read_int()?;
        let value = match tag {
            TAG_BYTE => Value::Byte(reader.read_byte()?),
            TAG_SHORT => Value::Short(reader.read_short()?),
            TAG_INT => Value::Int(reader.read_int()?),
            TAG_LONG => Value::Long(reader.read_long()?),
            TAG_FLOAT => Value::Float(reader.read_float()?),
            TAG_DOUBLE => Value::Double(reader.read_double()?),
            TAG_BOOL => Value::Bool(reader.read_bool()?),
            TAG_CHAR => Value::Char(reader.read_char()?),
            TAG_STRING => Value::String(reader.read_string()?),
            TAG_ARRAY => Value::Array(reader.read_seq(Value::read_from)?),
            TAG_LIST => Value::List(reader.read_seq(Value::read_from)?),
            TAG_MAP => Value::Map(reader.read_seq(|r| {
                let key = Value::read_from(r)?;
                let value = Value::read_from(r)?;
                Ok((key, value))
            })?),
            TAG_BYTE_ARRAY => Value::ByteArray(reader.read_byte_array()?.to_vec()),
            TAG_SHORT_ARRAY => Value::ShortArray(reader.read_seq(|r| r.read_short())?),
            TAG_INT_ARRAY => Value::IntArray(reader.read_seq(|r| r.read_int())?),
            TAG_LONG_ARRAY => Value::LongArray(reader.read_seq(|r| r.read_long())?),
            TAG_FLOAT_ARRAY => Value::FloatArray(reader.read_seq(|r| r.read_float())?),
            TAG_DOUBLE_ARRAY => Value::DoubleArray(reader.read_seq(|r| r.read_double())?),
            TAG_BOOL_ARRAY => Value::BoolArray(reader.read_seq(|r| r.read_bool())?),
            TAG_CHAR_ARRAY => Value::CharArray(reader.read_seq(|r| r.read_char())?),
            other => return Err(BinaryError::InvalidValueTag(other)),
        };
        Ok(value)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::ByteArray(v)
    }
}
