//! Bounds-checked primitive reads and writes over a fixed-capacity buffer.
//!
//! A [`ByteCursor`] owns its backing storage and a single monotonically
//! advancing position: writers append at the position, readers consume from
//! it. The capacity is fixed at construction and never grows; an operation
//! that would not fit fails with [`CodecError::EndOfBuffer`] and consumes
//! nothing.

use byteorder::{BigEndian, ByteOrder};

use crate::{CodecError, Result};

/// Fixed-capacity byte buffer with a monotonically advancing cursor.
///
/// All multi-byte values are two's-complement big-endian; `f32`/`f64` are
/// stored as the IEEE-754 bit pattern of the matching integer width; `char`
/// is a 4-byte Unicode code point, independent of any native character
/// width.
#[derive(Debug)]
pub struct ByteCursor {
    buf: Box<[u8]>,
    /// Bytes valid for reading: the initial contents for a read cursor, the
    /// high-water mark of writes otherwise.
    limit: usize,
    pos: usize,
}

impl ByteCursor {
    /// An empty cursor ready for writing up to `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            limit: 0,
            pos: 0,
        }
    }

    /// A cursor positioned at the start of existing bytes, ready for reading.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let buf = bytes.into_boxed_slice();
        let limit = buf.len();
        Self { buf, limit, pos: 0 }
    }

    /// Total backing capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Remaining unread bytes.
    pub fn available(&self) -> usize {
        self.limit - self.pos
    }

    /// `true` while at least one unread byte remains.
    pub fn has_available(&self) -> bool {
        self.available() > 0
    }

    /// Writable bytes left before the capacity is reached.
    pub fn remaining_capacity(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fails with `EndOfBuffer` unless `requested` more bytes fit.
    pub(crate) fn ensure_writable(&self, requested: usize) -> Result<()> {
        if self.pos + requested > self.buf.len() {
            return Err(CodecError::EndOfBuffer {
                requested,
                used: self.pos,
                capacity: self.buf.len(),
            });
        }
        Ok(())
    }

    fn ensure_readable(&self, requested: usize) -> Result<()> {
        if self.pos + requested > self.limit {
            return Err(CodecError::EndOfBuffer {
                requested,
                used: self.pos,
                capacity: self.limit,
            });
        }
        Ok(())
    }

    fn advance_write(&mut self, count: usize) {
        self.pos += count;
        self.limit = self.limit.max(self.pos);
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.ensure_writable(1)?;
        self.buf[self.pos] = value;
        self.advance_write(1);
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.ensure_writable(2)?;
        BigEndian::write_i16(&mut self.buf[self.pos..self.pos + 2], value);
        self.advance_write(2);
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.ensure_writable(2)?;
        BigEndian::write_u16(&mut self.buf[self.pos..self.pos + 2], value);
        self.advance_write(2);
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.ensure_writable(4)?;
        BigEndian::write_i32(&mut self.buf[self.pos..self.pos + 4], value);
        self.advance_write(4);
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.ensure_writable(8)?;
        BigEndian::write_i64(&mut self.buf[self.pos..self.pos + 8], value);
        self.advance_write(8);
        Ok(())
    }

    /// IEEE-754 bit pattern, stored as a big-endian `u32`.
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.ensure_writable(4)?;
        BigEndian::write_u32(&mut self.buf[self.pos..self.pos + 4], value.to_bits());
        self.advance_write(4);
        Ok(())
    }

    /// IEEE-754 bit pattern, stored as a big-endian `u64`.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.ensure_writable(8)?;
        BigEndian::write_u64(&mut self.buf[self.pos..self.pos + 8], value.to_bits());
        self.advance_write(8);
        Ok(())
    }

    /// Writes the canonical encoding: `1` for true, `0` for false.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// A 4-byte Unicode code point.
    pub fn write_char(&mut self, value: char) -> Result<()> {
        self.write_i32(value as u32 as i32)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_writable(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.advance_write(bytes.len());
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure_readable(1)?;
        let value = self.buf[self.pos];
        self.pos += 1;
        Ok(value)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure_readable(2)?;
        let value = BigEndian::read_i16(&self.buf[self.pos..self.pos + 2]);
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure_readable(2)?;
        let value = BigEndian::read_u16(&self.buf[self.pos..self.pos + 2]);
        self.pos += 2;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure_readable(4)?;
        let value = BigEndian::read_i32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(value)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure_readable(8)?;
        let value = BigEndian::read_i64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(value)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure_readable(4)?;
        let bits = BigEndian::read_u32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(f32::from_bits(bits))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure_readable(8)?;
        let bits = BigEndian::read_u64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(f64::from_bits(bits))
    }

    /// Any value `>= 1` decodes as true; only `1` is ever written.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? >= 1)
    }

    pub fn read_char(&mut self) -> Result<char> {
        let code = self.read_i32()? as u32;
        char::from_u32(code).ok_or(CodecError::InvalidCodePoint(code))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure_readable(len)?;
        let bytes = self.buf[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(bytes)
    }

    /// Advance past `count` bytes without materializing a value.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure_readable(count)?;
        self.pos += count;
        Ok(())
    }

    /// Exactly the bytes written so far, not the full backing capacity.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.buf.into_vec();
        bytes.truncate(self.pos);
        bytes
    }
}
