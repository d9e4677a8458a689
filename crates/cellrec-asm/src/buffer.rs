//! Caller-owned output buffer for encoded instructions.

use crate::error::{EncodeError, Result};

/// Byte order of emitted instruction words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// PPU and SPU code.
    #[default]
    Big,
    /// AArch64 code.
    Little,
}

impl ByteOrder {
    const fn bytes(self, word: u32) -> [u8; 4] {
        match self {
            Self::Big => word.to_be_bytes(),
            Self::Little => word.to_le_bytes(),
        }
    }

    const fn word(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Big => u32::from_be_bytes(bytes),
            Self::Little => u32::from_le_bytes(bytes),
        }
    }
}

/// Writes instruction words into a borrowed byte slice, big-endian unless
/// configured otherwise.
///
/// The buffer never grows. A write that does not fit fails with
/// [`EncodeError::BufferOverflow`] and leaves the cursor where it was.
pub struct CodeBuffer<'a> {
    data: &'a mut [u8],
    offset: usize,
    base: u64,
    order: ByteOrder,
}

impl<'a> CodeBuffer<'a> {
    /// Wrap `data`; addresses start at zero.
    pub const fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
            order: ByteOrder::Big,
        }
    }

    /// Set the address the first byte of the buffer will live at.
    #[must_use]
    pub const fn with_base_address(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub const fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    #[inline]
    pub const fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes written so far.
    #[inline]
    pub const fn current_size(&self) -> usize {
        self.offset
    }

    /// Address of the next byte to be written.
    #[inline]
    pub const fn current_address(&self) -> u64 {
        self.base + self.offset as u64
    }

    #[inline]
    pub const fn base_address(&self) -> u64 {
        self.base
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// The written prefix.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.offset]
    }

    pub fn emit_u32(&mut self, word: u32) -> Result<()> {
        let end = self.check(self.offset, 4)?;
        self.data[self.offset..end].copy_from_slice(&self.order.bytes(word));
        self.offset = end;
        Ok(())
    }

    /// Read back a previously written word.
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let end = self.check_written(offset)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[offset..end]);
        Ok(self.order.word(bytes))
    }

    /// Overwrite a previously written word.
    pub fn patch_u32(&mut self, offset: usize, word: u32) -> Result<()> {
        let end = self.check_written(offset)?;
        self.data[offset..end].copy_from_slice(&self.order.bytes(word));
        Ok(())
    }

    const fn check(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(EncodeError::BufferOverflow {
                needed: len,
                remaining: self.data.len().saturating_sub(offset),
            }),
        }
    }

    const fn check_written(&self, offset: usize) -> Result<usize> {
        match offset.checked_add(4) {
            Some(end) if end <= self.offset => Ok(end),
            _ => Err(EncodeError::BufferOverflow {
                needed: 4,
                remaining: self.offset.saturating_sub(offset),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_big_endian() {
        let mut mem = [0u8; 8];
        let mut buf = CodeBuffer::new(&mut mem).with_base_address(0x1_0000);
        buf.emit_u32(0x7C08_02A6).unwrap();
        assert_eq!(buf.current_size(), 4);
        assert_eq!(buf.current_address(), 0x1_0004);
        assert_eq!(buf.as_bytes(), &[0x7C, 0x08, 0x02, 0xA6]);
        assert_eq!(buf.read_u32(0).unwrap(), 0x7C08_02A6);
    }

    #[test]
    fn test_little_endian_round_trips_through_patch() {
        let mut mem = [0u8; 4];
        let mut buf = CodeBuffer::new(&mut mem).with_byte_order(ByteOrder::Little);
        buf.emit_u32(0x1400_0000).unwrap();
        assert_eq!(buf.as_bytes(), &[0x00, 0x00, 0x00, 0x14]);
        buf.patch_u32(0, 0x1400_0002).unwrap();
        assert_eq!(buf.read_u32(0).unwrap(), 0x1400_0002);
        assert_eq!(buf.as_bytes(), &[0x02, 0x00, 0x00, 0x14]);
    }

    #[test]
    fn test_overflow_keeps_cursor() {
        let mut mem = [0u8; 6];
        let mut buf = CodeBuffer::new(&mut mem);
        buf.emit_u32(1).unwrap();
        assert_eq!(
            buf.emit_u32(2),
            Err(EncodeError::BufferOverflow {
                needed: 4,
                remaining: 2
            })
        );
        assert_eq!(buf.current_size(), 4);
        assert_eq!(buf.remaining(), 2);
    }

    #[test]
    fn test_patch_only_written_words() {
        let mut mem = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut mem);
        buf.emit_u32(0x4800_0000).unwrap();
        buf.patch_u32(0, 0x4800_0010).unwrap();
        assert_eq!(buf.read_u32(0).unwrap(), 0x4800_0010);
        assert!(buf.patch_u32(4, 0).is_err());
    }
}
