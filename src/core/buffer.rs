//! # Packet Buffers
//!
//! Primitive readers and writers for packet bodies.
//!
//! All numeric fields are little-endian. Text is stored as UTF-16 code units,
//! two bytes each, in one of two shapes:
//!
//! - **terminated**: the code units followed by a single zero unit. The length
//!   is implicit; producers that embed such a string in a sized block account
//!   for [`utf16_len`] plus 2 bytes themselves. A terminated string cannot
//!   carry U+0000, so the text is cut at its first NUL on the way out.
//! - **prefixed**: a `u16` unit count followed by the code units.
//!
//! [`PacketWriter`] never fails: it only appends. [`PacketReader`] checks every
//! read against the bytes left in the frame and reports
//! [`ProtocolError::Truncated`] instead of reading past the end, so a lying
//! client can only ever spoil its own frame.

use crate::error::{constants, ProtocolError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Cursor over one frame body.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(ProtocolError::Truncated {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.data[start..start + len])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.take_array().map(i32::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.take_array().map(i64::from_le_bytes)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.take_array().map(f64::from_le_bytes)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Split off the next `len` bytes as an independent reader.
    pub fn sub_reader(&mut self, len: usize) -> Result<PacketReader<'a>> {
        self.take(len).map(PacketReader::new)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Read a zero-terminated UTF-16 string.
    pub fn read_string(&mut self) -> Result<String> {
        let rest = self.rest();
        let units = rest
            .chunks_exact(2)
            .position(|unit| unit == [0, 0])
            .ok_or(ProtocolError::MalformedString(
                constants::ERR_UNTERMINATED_STRING,
            ))?;
        let raw = self.take(units * 2)?;
        self.skip(2)?;
        decode_utf16(raw)
    }

    /// Read a `u16`-counted UTF-16 string.
    pub fn read_prefixed_string(&mut self) -> Result<String> {
        let units = self.read_u16()? as usize;
        let raw = self.take(units * 2)?;
        decode_utf16(raw)
    }
}

fn decode_utf16(raw: &[u8]) -> Result<String> {
    let units = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| ProtocolError::MalformedString(constants::ERR_INVALID_UTF16))
}

/// Code units [`PacketWriter::write_string`] emits before the terminator.
fn terminated_units(value: &str) -> impl Iterator<Item = u16> + '_ {
    value.encode_utf16().take_while(|unit| *unit != 0)
}

/// Bytes `value` occupies as a terminated string, without the terminator.
pub fn utf16_len(value: &str) -> usize {
    terminated_units(value).count() * 2
}

/// Growable packet body.
#[derive(Debug, Default, Clone)]
pub struct PacketWriter {
    data: BytesMut,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self {
            data: BytesMut::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.put_u8(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.put_u16_le(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.put_i32_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.put_u32_le(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.put_i64_le(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.data.put_f64_le(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write `value` as UTF-16 code units followed by a zero unit. Anything
    /// from the first NUL on is dropped.
    pub fn write_string(&mut self, value: &str) {
        for unit in terminated_units(value) {
            self.data.put_u16_le(unit);
        }
        self.data.put_u16_le(0);
    }

    /// Write a `u16` unit count followed by the UTF-16 code units.
    ///
    /// Strings longer than `u16::MAX` units are cut at that bound.
    pub fn write_prefixed_string(&mut self, value: &str) {
        let units: Vec<u16> = value.encode_utf16().take(u16::MAX as usize).collect();
        self.data.put_u16_le(units.len() as u16);
        for unit in units {
            self.data.put_u16_le(unit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_little_endian() {
        let mut writer = PacketWriter::new();
        writer.write_u16(0x0102);
        writer.write_i32(-2);
        writer.write_i64(0x0102_0304_0506_0708);
        assert_eq!(
            writer.as_slice(),
            &[
                0x02, 0x01, 0xFE, 0xFF, 0xFF, 0xFF, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02,
                0x01
            ]
        );
    }

    #[test]
    fn mixed_fields_read_back() {
        let mut writer = PacketWriter::new();
        writer.write_u8(7);
        writer.write_f64(1.25);
        writer.write_string("Adena");
        writer.write_prefixed_string("Giran");
        writer.write_i32(42);

        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.read_f64().unwrap(), 1.25);
        assert_eq!(reader.read_string().unwrap(), "Adena");
        assert_eq!(reader.read_prefixed_string().unwrap(), "Giran");
        assert_eq!(reader.read_i32().unwrap(), 42);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn terminated_string_layout() {
        let mut writer = PacketWriter::new();
        writer.write_string("ab");
        assert_eq!(writer.as_slice(), &[b'a', 0, b'b', 0, 0, 0]);
        assert_eq!(utf16_len("ab"), 4);
    }

    #[test]
    fn embedded_nul_ends_terminated_string() {
        let mut writer = PacketWriter::new();
        writer.write_string("a\0b");
        writer.write_i32(7);
        assert_eq!(utf16_len("a\0b"), 2);
        assert_eq!(writer.len(), utf16_len("a\0b") + 2 + 4);

        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(reader.read_string().unwrap(), "a");
        assert_eq!(reader.read_i32().unwrap(), 7);
    }

    #[test]
    fn truncated_read_reports_shortfall() {
        let mut reader = PacketReader::new(&[1, 2, 3]);
        match reader.read_i32() {
            Err(ProtocolError::Truncated { needed, remaining }) => {
                assert_eq!(needed, 4);
                assert_eq!(remaining, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
        // The failed read must not consume anything
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn unterminated_string_is_rejected() {
        let mut reader = PacketReader::new(&[b'a', 0, b'b', 0]);
        assert!(matches!(
            reader.read_string(),
            Err(ProtocolError::MalformedString(_))
        ));
    }

    #[test]
    fn odd_trailing_byte_does_not_fake_a_terminator() {
        // 'a', then a lone zero byte: no aligned zero unit exists
        let mut reader = PacketReader::new(&[b'a', 0, 0]);
        assert!(reader.read_string().is_err());
    }

    #[test]
    fn sub_reader_is_isolated() {
        let data = [1, 0, 2, 0, 9];
        let mut reader = PacketReader::new(&data);
        let mut block = reader.sub_reader(4).unwrap();
        assert_eq!(block.read_u16().unwrap(), 1);
        assert_eq!(block.read_u16().unwrap(), 2);
        assert!(block.read_u8().is_err());
        assert_eq!(reader.read_u8().unwrap(), 9);
    }
}
