use bytes::{Buf, Bytes};

use crate::error::{BinaryError, Result};
use crate::value::Value;
use crate::writer::NULL_SENTINEL;

/// Reads schema-fixed binary data from a byte buffer.
///
/// The reader carries no type information; callers must know, from the
/// packet's type id, exactly which sequence of reads to perform. Every
/// read checks bounds first and fails with `UnexpectedEof` instead of
/// panicking on truncated input.
pub struct BinaryReader {
    buf: Bytes,
}

impl BinaryReader {
    /// Create a reader over a byte buffer.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self { buf: bytes.into() }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// True if every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn check(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(BinaryError::UnexpectedEof {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    /// Read a signed byte.
    pub fn read_byte(&mut self) -> Result<i8> {
        self.check(1)?;
        Ok(self.buf.get_i8())
    }

    /// Read a 16-bit integer.
    pub fn read_short(&mut self) -> Result<i16> {
        self.check(2)?;
        Ok(self.buf.get_i16())
    }

    /// Read a 32-bit integer.
    pub fn read_int(&mut self) -> Result<i32> {
        self.check(4)?;
        Ok(self.buf.get_i32())
    }

    /// Read a 64-bit integer.
    pub fn read_long(&mut self) -> Result<i64> {
        self.check(8)?;
        Ok(self.buf.get_i64())
    }

    /// Read an IEEE754 single-precision float.
    pub fn read_float(&mut self) -> Result<f32> {
        self.check(4)?;
        Ok(self.buf.get_f32())
    }

    /// Read an IEEE754 double-precision float.
    pub fn read_double(&mut self) -> Result<f64> {
        self.check(8)?;
        Ok(self.buf.get_f64())
    }

    /// Read a boolean; any non-zero byte is true.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.check(1)?;
        Ok(self.buf.get_u8() != 0)
    }

    /// Read a char from its 32-bit Unicode scalar value.
    pub fn read_char(&mut self) -> Result<char> {
        self.check(4)?;
        let scalar = self.buf.get_u32();
        char::from_u32(scalar).ok_or(BinaryError::InvalidChar(scalar))
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(Into::into)
    }

    /// Read a nullable string; length -1 decodes as `None`.
    pub fn read_nullable_string(&mut self) -> Result<Option<String>> {
        self.check(4)?;
        let len = self.buf.get_i32();
        if len == NULL_SENTINEL {
            return Ok(None);
        }
        if len < 0 {
            return Err(BinaryError::InvalidLength(len));
        }
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(Into::into)
    }

    /// Read a length-prefixed byte array.
    pub fn read_byte_array(&mut self) -> Result<Bytes> {
        let len = self.read_len()?;
        self.take(len)
    }

    /// Consume and return every unread byte.
    ///
    /// The counterpart of `BinaryWriter::write_raw`: the payload's extent
    /// is the rest of the message.
    pub fn read_remaining(&mut self) -> Bytes {
        self.buf.split_to(self.buf.len())
    }

    /// Read a homogeneous sequence: an i32 count, then each element
    /// through the supplied element reader.
    pub fn read_seq<T>(&mut self, mut read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_len()?;
        // A hostile count must not drive the allocation; the buffer bounds it.
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Read an optional embedded object written with a presence flag.
    pub fn read_nullable<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        self.check(4)?;
        let flag = self.buf.get_i32();
        if flag == NULL_SENTINEL {
            return Ok(None);
        }
        read(self).map(Some)
    }

    /// Read a self-describing tagged value.
    pub fn read_value(&mut self) -> Result<Value> {
        Value::read_from(self)
    }

    /// Read a property map written by `BinaryWriter::write_properties`.
    pub fn read_properties(&mut self) -> Result<Vec<(String, Value)>> {
        let count = self.read_len()?;
        let mut properties = Vec::with_capacity(count.min(self.remaining()));
        for entry in 0..count {
            let key = self
                .read_nullable_string()?
                .ok_or(BinaryError::NullPropertyKey(entry))?;
            let value = Value::read_from(self)?;
            properties.push((key, value));
        }
        Ok(properties)
    }

    fn read_len(&mut self) -> Result<usize> {
        self.check(4)?;
        let len = self.buf.get_i32();
        if len < 0 {
            return Err(BinaryError::InvalidLength(len));
        }
        Ok(len as usize)
    }

    fn take(&mut self, len: usize) -> Result<Bytes> {
        self.check(len)?;
        Ok(self.buf.split_to(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::BinaryWriter;

    #[test]
    fn primitive_roundtrip() {
        let mut writer = BinaryWriter::new();
        writer.write_byte(-5);
        writer.write_short(-300);
        writer.write_int(123_456);
        writer.write_long(-9_000_000_000);
        writer.write_float(1.5);
        writer.write_double(-2.25);
        writer.write_bool(true);
        writer.write_char('文');

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert_eq!(reader.read_byte().unwrap(), -5);
        assert_eq!(reader.read_short().unwrap(), -300);
        assert_eq!(reader.read_int().unwrap(), 123_456);
        assert_eq!(reader.read_long().unwrap(), -9_000_000_000);
        assert_eq!(reader.read_float().unwrap(), 1.5);
        assert_eq!(reader.read_double().unwrap(), -2.25);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_char().unwrap(), '文');
        assert!(reader.is_empty());
    }

    #[test]
    fn string_roundtrip() {
        let mut writer = BinaryWriter::new();
        writer.write_string("héllo, 世界");

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert_eq!(reader.read_string().unwrap(), "héllo, 世界");
    }

    #[test]
    fn empty_string_roundtrip() {
        let mut writer = BinaryWriter::new();
        writer.write_string("");

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert_eq!(reader.read_string().unwrap(), "");
        assert!(reader.is_empty());
    }

    #[test]
    fn byte_array_roundtrip() {
        let payload = vec![0xAB; 1024];
        let mut writer = BinaryWriter::new();
        writer.write_byte_array(&payload);

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert_eq!(reader.read_byte_array().unwrap().as_ref(), &payload[..]);
    }

    #[test]
    fn truncated_read_fails_without_panic() {
        let mut reader = BinaryReader::new(vec![0x00, 0x01]);
        let err = reader.read_int().unwrap_err();
        assert!(matches!(
            err,
            BinaryError::UnexpectedEof {
                needed: 4,
                remaining: 2
            }
        ));
    }

    #[test]
    fn string_with_truncated_body_fails() {
        let mut writer = BinaryWriter::new();
        writer.write_int(100); // length prefix far beyond the buffer
        writer.write_byte(1);

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert!(matches!(
            reader.read_string().unwrap_err(),
            BinaryError::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn negative_length_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_int(-2);

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert!(matches!(
            reader.read_string().unwrap_err(),
            BinaryError::InvalidLength(-2)
        ));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_byte_array(&[0xFF, 0xFE, 0xFD]);

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert!(matches!(
            reader.read_string().unwrap_err(),
            BinaryError::InvalidUtf8(_)
        ));
    }

    #[test]
    fn invalid_char_scalar_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_int(0xD800_u32 as i32); // surrogate range

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert!(matches!(
            reader.read_char().unwrap_err(),
            BinaryError::InvalidChar(0xD800)
        ));
    }

    #[test]
    fn hostile_sequence_count_does_not_allocate() {
        let mut writer = BinaryWriter::new();
        writer.write_int(i32::MAX);

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert!(matches!(
            reader.read_seq(|r| r.read_int()).unwrap_err(),
            BinaryError::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn nested_sequence_roundtrip() {
        let rows = vec![vec![1i32, 2], vec![3], vec![]];
        let mut writer = BinaryWriter::new();
        writer.write_seq(&rows, |w, row| {
            w.write_seq(row, |w, v| w.write_int(*v));
        });

        let mut reader = BinaryReader::new(writer.into_bytes());
        let decoded = reader
            .read_seq(|r| r.read_seq(|r| r.read_int()))
            .unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn properties_roundtrip() {
        let properties = vec![
            ("name".to_string(), Value::String("link".to_string())),
            ("retries".to_string(), Value::Int(3)),
        ];
        let mut writer = BinaryWriter::new();
        writer.write_properties(&properties);

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert_eq!(reader.read_properties().unwrap(), properties);
    }

    #[test]
    fn property_with_null_key_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_int(1);
        writer.write_nullable_string(None);
        writer.write_value(&Value::Int(1));

        let mut reader = BinaryReader::new(writer.into_bytes());
        assert!(matches!(
            reader.read_properties().unwrap_err(),
            BinaryError::NullPropertyKey(0)
        ));
    }
}
