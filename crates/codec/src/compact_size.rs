//! Bitcoin compact-size integers.
//!
//! The first byte selects the layout, trailing bytes are little-endian.
//!
//! ```txt
//! 0x00..=0xfc           value is the byte itself
//! 0xfd  [u16 le]        3 bytes total
//! 0xfe  [u32 le]        5 bytes total
//! 0xff  [u64 le]        9 bytes total
//! ```

use crate::cursor::ByteCursor;
use crate::errors::CodecError;
use crate::types::{Codec, Decoder, Encoder};

const TAG_U16: u8 = 0xfd;
const TAG_U32: u8 = 0xfe;
const TAG_U64: u8 = 0xff;

/// A compact-size value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CompactSize(u64);

impl CompactSize {
    /// Constructs a new instance.
    pub fn new(v: u64) -> Self {
        Self(v)
    }

    /// Constructs a new instance from a usize.
    pub fn from_usize(v: usize) -> Self {
        Self(v as u64)
    }

    /// Converts to inner value.
    pub fn inner(self) -> u64 {
        self.0
    }

    /// Gets the width class the value is encoded with.
    pub fn width(&self) -> CompactSizeWidth {
        if self.0 < TAG_U16 as u64 {
            CompactSizeWidth::U8
        } else if self.0 <= u16::MAX as u64 {
            CompactSizeWidth::U16
        } else if self.0 <= u32::MAX as u64 {
            CompactSizeWidth::U32
        } else {
            CompactSizeWidth::U64
        }
    }

    /// Convenience function for returning the encoded length in bytes.
    pub fn byte_len(&self) -> usize {
        self.width().byte_len()
    }
}

impl Codec for CompactSize {
    fn decode(dec: &mut impl Decoder) -> Result<Self, CodecError> {
        let value = match u8::decode(dec)? {
            TAG_U16 => u16::decode(dec)? as u64,
            TAG_U32 => u32::decode(dec)? as u64,
            TAG_U64 => u64::decode(dec)?,
            b => b as u64,
        };

        Ok(Self(value))
    }

    fn encode(&self, enc: &mut impl Encoder) -> Result<(), CodecError> {
        match self.width() {
            CompactSizeWidth::U8 => (self.0 as u8).encode(enc),
            CompactSizeWidth::U16 => {
                enc.write_u8(TAG_U16)?;
                (self.0 as u16).encode(enc)
            }
            CompactSizeWidth::U32 => {
                enc.write_u8(TAG_U32)?;
                (self.0 as u32).encode(enc)
            }
            CompactSizeWidth::U64 => {
                enc.write_u8(TAG_U64)?;
                self.0.encode(enc)
            }
        }
    }
}

/// Describes the width that a compact-size will be encoded as, by referring
/// to the unsigned integer type that follows the tag byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum CompactSizeWidth {
    /// 1 byte, no tag
    U8,

    /// 3 bytes
    U16,

    /// 5 bytes
    U32,

    /// 9 bytes
    U64,
}

impl CompactSizeWidth {
    /// Returns the number of bytes to encode the compact-size.
    pub fn byte_len(&self) -> usize {
        match self {
            CompactSizeWidth::U8 => 1,
            CompactSizeWidth::U16 => 3,
            CompactSizeWidth::U32 => 5,
            CompactSizeWidth::U64 => 9,
        }
    }
}

/// Reads a compact-size at `pos`, returning the value and the offset just
/// past it.
pub fn read_compact_size(buf: &[u8], pos: usize) -> Result<(u64, usize), CodecError> {
    let mut cur = ByteCursor::with_position(buf, pos);
    let v = cur.read_compact_size()?;
    Ok((v, cur.pos()))
}

/// Appends the shortest compact-size encoding of `value`.
pub fn write_compact_size(value: u64, out: &mut Vec<u8>) {
    // Writing into a vec can't fail.
    let _ = CompactSize::new(value).encode(out);
}

/// Returns how many bytes `value` takes as a compact-size.
pub fn compact_size_len(value: u64) -> usize {
    CompactSize::new(value).byte_len()
}
