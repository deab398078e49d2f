use bytes::{BufMut, Bytes, BytesMut};

use crate::value::Value;

const INITIAL_CAPACITY: usize = 256;

/// Null sentinel used by the nullable string and nullable object forms.
pub(crate) const NULL_SENTINEL: i32 = -1;

/// Writes schema-fixed binary data into a growable buffer.
///
/// All multi-byte values are big-endian (network byte order). The writer
/// never fails; the buffer grows as needed.
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an empty writer with an initial buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Write a single signed byte.
    pub fn write_byte(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    /// Write a 16-bit integer.
    pub fn write_short(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    /// Write a 32-bit integer.
    pub fn write_int(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    /// Write a 64-bit integer.
    pub fn write_long(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    /// Write an IEEE754 single-precision float.
    pub fn write_float(&mut self, value: f32) {
        self.buf.put_f32(value);
    }

    /// Write an IEEE754 double-precision float.
    pub fn write_double(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    /// Write a boolean as one byte (0 or 1).
    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    /// Write a char as its 32-bit Unicode scalar value.
    pub fn write_char(&mut self, value: char) {
        self.buf.put_u32(value as u32);
    }

    /// Write a string as an i32 UTF-8 byte length followed by the bytes.
    ///
    /// No trailing terminator is written.
    pub fn write_string(&mut self, value: &str) {
        self.buf.put_i32(value.len() as i32);
        self.buf.put_slice(value.as_bytes());
    }

    /// Write an optional string; absence is encoded as length -1.
    pub fn write_nullable_string(&mut self, value: Option<&str>) {
        match value {
            Some(s) => self.write_string(s),
            None => self.buf.put_i32(NULL_SENTINEL),
        }
    }

    /// Write a byte array as an i32 length followed by the bytes.
    pub fn write_byte_array(&mut self, bytes: &[u8]) {
        self.buf.put_i32(bytes.len() as i32);
        self.buf.put_slice(bytes);
    }

    /// Append raw bytes with no length prefix.
    ///
    /// For embedding an already-encoded payload whose extent is bounded by
    /// the enclosing message, not by a prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a homogeneous sequence: an i32 count, then each element
    /// through the supplied element writer.
    ///
    /// This is the single path for both primitive sequences and sequences
    /// of complex sub-objects.
    pub fn write_seq<T>(&mut self, items: &[T], mut write: impl FnMut(&mut Self, &T)) {
        self.buf.put_i32(items.len() as i32);
        for item in items {
            write(self, item);
        }
    }

    /// Write an optional embedded object: an i32 presence flag (-1 absent,
    /// 0 present), then the object through the supplied writer.
    pub fn write_nullable<T>(&mut self, value: Option<&T>, write: impl FnOnce(&mut Self, &T)) {
        match value {
            Some(inner) => {
                self.buf.put_i32(0);
                write(self, inner);
            }
            None => self.buf.put_i32(NULL_SENTINEL),
        }
    }

    /// Write a self-describing tagged value.
    pub fn write_value(&mut self, value: &Value) {
        value.write_to(self);
    }

    /// Write a property map: an i32 entry count, then per entry a nullable
    /// string key and a tagged value.
    pub fn write_properties(&mut self, properties: &[(String, Value)]) {
        self.buf.put_i32(properties.len() as i32);
        for (key, value) in properties {
            self.write_nullable_string(Some(key));
            value.write_to(self);
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the written bytes without consuming the writer.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return the written bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}
