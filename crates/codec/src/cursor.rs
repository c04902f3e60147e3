//! Position-tracking reader over a flat byte buffer.

use crate::compact_size::CompactSize;
use crate::errors::CodecError;
use crate::push::{PushMode, read_push_length_with};
use crate::types::{Codec, Decoder};

/// Sequential reader over a borrowed byte slice.
///
/// Unlike a plain [`std::io::Read`] this remembers the absolute offset of
/// every read, which the walker needs to label byte ranges, and hands out
/// subslices that borrow from the underlying buffer rather than the cursor.
#[derive(Clone, Debug)]
pub struct ByteCursor<'b> {
    buf: &'b [u8],
    at: usize,
}

impl<'b> ByteCursor<'b> {
    /// Constructs a new instance by wrapping a buffer and starting at the
    /// beginning.
    pub fn new(buf: &'b [u8]) -> Self {
        Self { buf, at: 0 }
    }

    /// Constructs a new instance starting at `at`.  Positions past the end
    /// are clamped so later reads report truncation instead of panicking.
    pub fn with_position(buf: &'b [u8], at: usize) -> Self {
        Self {
            buf,
            at: at.min(buf.len()),
        }
    }

    /// Returns the length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the absolute offset of the next byte to be read.
    pub fn pos(&self) -> usize {
        self.at
    }

    /// Returns the total number of remaining bytes that can be read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.at
    }

    /// Returns the slice of the remaining unread bytes, which might be empty.
    pub fn rest(&self) -> &'b [u8] {
        &self.buf[self.at..]
    }

    fn check(&self, needed: usize) -> Result<(), CodecError> {
        if needed > self.remaining() {
            return Err(CodecError::TruncatedInput {
                at: self.at,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Returns the next `N` bytes without consuming them.
    pub fn peek_arr<const N: usize>(&self) -> Option<[u8; N]> {
        self.rest().get(..N)?.try_into().ok()
    }

    /// Consumes `n` bytes and returns them.
    pub fn read_slice(&mut self, n: usize) -> Result<&'b [u8], CodecError> {
        self.check(n)?;
        let out = &self.buf[self.at..self.at + n];
        self.at += n;
        Ok(out)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        u8::decode(self)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        u32::decode(self)
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64_le(&mut self) -> Result<u64, CodecError> {
        u64::decode(self)
    }

    /// Reads a Bitcoin compact-size integer.
    pub fn read_compact_size(&mut self) -> Result<u64, CodecError> {
        CompactSize::decode(self).map(CompactSize::inner)
    }

    /// Reads the length announced by a script push opcode, leaving the
    /// cursor at the first data byte.
    pub fn read_push_length(&mut self, mode: PushMode) -> Result<u64, CodecError> {
        let (len, next) = read_push_length_with(self.buf, self.at, mode)?;
        self.at = next;
        Ok(len)
    }
}

impl Decoder for ByteCursor<'_> {
    fn read_buf(&mut self, into: &mut [u8]) -> Result<(), CodecError> {
        let src = self.read_slice(into.len())?;
        into.copy_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance() {
        let buf = [0x01, 0x02, 0x00, 0x00, 0x00, 0xaa, 0xbb];
        let mut cur = ByteCursor::new(&buf);

        assert_eq!(cur.read_u8().unwrap(), 1);
        assert_eq!(cur.read_u32_le().unwrap(), 2);
        assert_eq!(cur.pos(), 5);
        assert_eq!(cur.peek_arr::<2>(), Some([0xaa, 0xbb]));
        assert_eq!(cur.read_slice(2).unwrap(), &[0xaa, 0xbb]);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_reports_offset() {
        let buf = [0u8; 3];
        let mut cur = ByteCursor::new(&buf);
        cur.read_u8().unwrap();

        let err = cur.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedInput {
                at: 1,
                needed: 4,
                remaining: 2
            }
        );

        // Failed reads don't move the cursor.
        assert_eq!(cur.pos(), 1);
    }

    #[test]
    fn test_with_position_clamps() {
        let buf = [0u8; 2];
        let mut cur = ByteCursor::with_position(&buf, 10);
        assert_eq!(cur.remaining(), 0);
        assert!(cur.read_u8().is_err());
    }
}
