//! Big-endian payload reader.

use crate::error::{Result, SomeIpError};

/// Consumes SOME/IP-serialized values from a byte slice with a cursor.
///
/// Every read checks the remaining byte count first; a failed read
/// returns a malformed-input error and leaves the cursor where it was.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    /// Create a new reader over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Reset the cursor to the beginning.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Get the current cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Move the cursor to an absolute position.
    ///
    /// Fails if `pos` is past the end of the buffer; the cursor is left
    /// unchanged in that case.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(SomeIpError::InvalidArgument(format!(
                "position {pos} past end of {}-byte buffer",
                self.data.len()
            )));
        }
        self.position = pos;
        Ok(())
    }

    /// Advance the cursor by `bytes`, saturating at the end.
    pub fn skip(&mut self, bytes: usize) {
        self.position = (self.position + bytes).min(self.data.len());
    }

    /// Advance the cursor to the next multiple of `alignment`,
    /// saturating at the end.
    pub fn align_to(&mut self, alignment: usize) {
        if alignment <= 1 {
            return;
        }
        let padding = (alignment - (self.position % alignment)) % alignment;
        self.skip(padding);
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(SomeIpError::BufferUnderrun {
                needed: count,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Read a boolean (any non-zero byte is `true`).
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.take(1)?[0] != 0x00)
    }

    /// Read an unsigned 8-bit integer.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a signed 8-bit integer.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read an unsigned 16-bit integer, big-endian.
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a signed 16-bit integer, big-endian.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    /// Read an unsigned 32-bit integer, big-endian.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a signed 32-bit integer, big-endian.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    /// Read an unsigned 64-bit integer, big-endian.
    ///
    /// Single full-width byte shuffle; never two 32-bit swaps.
    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Read a signed 64-bit integer, big-endian.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    /// Read a 32-bit IEEE-754 float from its big-endian bit pattern.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read a 64-bit IEEE-754 float from its big-endian bit pattern.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read a string: 4-byte big-endian byte length, the raw UTF-8
    /// bytes, then skip padding to the next 4-byte boundary.
    ///
    /// Leaves the cursor unchanged on failure.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.position;
        let length = self.read_u32()? as usize;

        let bytes = match self.take(length) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.position = start;
                return Err(e);
            }
        };

        match std::str::from_utf8(bytes) {
            Ok(s) => {
                let value = s.to_owned();
                self.align_to(4);
                Ok(value)
            }
            Err(_) => {
                self.position = start;
                Err(SomeIpError::malformed("invalid UTF-8 in string"))
            }
        }
    }

    /// Read raw bytes without a length prefix.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    /// Read an array: 4-byte big-endian element count, then each
    /// element in order.
    pub fn read_array<T: WireRead>(&mut self) -> Result<Vec<T>> {
        let start = self.position;
        let count = self.read_u32()? as usize;

        // Every element costs at least one byte; a count beyond the
        // remaining data is malformed, not an allocation request.
        if count > self.remaining() {
            self.position = start;
            return Err(SomeIpError::malformed(format!(
                "array count {count} exceeds {} remaining bytes",
                self.data.len() - start - 4
            )));
        }

        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            match T::read_from(self) {
                Ok(value) => result.push(value),
                Err(e) => {
                    self.position = start;
                    return Err(e);
                }
            }
        }
        Ok(result)
    }
}

/// Types that deserialize themselves as a SOME/IP array element.
pub trait WireRead: Sized {
    /// Read one value from the reader.
    fn read_from(reader: &mut Reader<'_>) -> Result<Self>;
}

impl WireRead for bool {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_bool()
    }
}

impl WireRead for u8 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_u8()
    }
}

impl WireRead for i8 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_i8()
    }
}

impl WireRead for u16 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_u16()
    }
}

impl WireRead for i16 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_i16()
    }
}

impl WireRead for u32 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_u32()
    }
}

impl WireRead for i32 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_i32()
    }
}

impl WireRead for u64 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_u64()
    }
}

impl WireRead for i64 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_i64()
    }
}

impl WireRead for f32 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_f32()
    }
}

impl WireRead for f64 {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_f64()
    }
}

impl WireRead for String {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.read_string()
    }
}
