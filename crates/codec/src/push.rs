//! Script data-push length fields.

use crate::cursor::ByteCursor;
use crate::errors::CodecError;
use crate::types::Codec;

/// `OP_PUSHDATA1`, followed by a 1 byte length.
pub const OP_PUSHDATA1: u8 = 0x4c;

/// `OP_PUSHDATA2`, followed by a 2 byte little-endian length.
pub const OP_PUSHDATA2: u8 = 0x4d;

/// `OP_PUSHDATA4`, followed by a 4 byte little-endian length.
pub const OP_PUSHDATA4: u8 = 0x4e;

/// Largest push we emit.  Anything bigger would need `OP_PUSHDATA4`, which no
/// carrier uses.
pub const MAX_PUSH_LEN: usize = u16::MAX as usize;

/// Largest direct push, where the opcode is the length.
const MAX_DIRECT_PUSH: usize = 0x4b;

/// How a non-push opcode is treated when reading a push length.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PushMode {
    /// Fail with [`CodecError::InvalidPushOpcode`].
    #[default]
    Strict,

    /// Treat it as a zero-length push that consumes only the opcode.
    Lenient,
}

/// The shortest push form for a given data length.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PushEncoding {
    /// The opcode is the length (0..=75).
    Direct,

    /// `OP_PUSHDATA1 <u8>`.
    PushData1,

    /// `OP_PUSHDATA2 <u16 le>`.
    PushData2,
}

impl PushEncoding {
    /// Picks the shortest form able to express `len`, if any.
    pub fn for_len(len: usize) -> Option<Self> {
        if len <= MAX_DIRECT_PUSH {
            Some(Self::Direct)
        } else if len <= u8::MAX as usize {
            Some(Self::PushData1)
        } else if len <= MAX_PUSH_LEN {
            Some(Self::PushData2)
        } else {
            None
        }
    }

    /// Number of bytes the opcode and length field take together.
    pub fn header_len(&self) -> usize {
        match self {
            Self::Direct => 1,
            Self::PushData1 => 2,
            Self::PushData2 => 3,
        }
    }
}

/// Reads a push length at `pos` in strict mode, returning the length and
/// the offset of the first data byte.
pub fn read_push_length(buf: &[u8], pos: usize) -> Result<(u64, usize), CodecError> {
    read_push_length_with(buf, pos, PushMode::Strict)
}

/// Reads a push length at `pos` with an explicit [`PushMode`].
///
/// `0x00` (`OP_0`) is an empty push in both modes.  This only reads the
/// length field, it does not check the data bytes are present.
pub fn read_push_length_with(
    buf: &[u8],
    pos: usize,
    mode: PushMode,
) -> Result<(u64, usize), CodecError> {
    let mut cur = ByteCursor::with_position(buf, pos);
    let op = cur.read_u8()?;

    let len = match op {
        0x00..=0x4b => op as u64,
        OP_PUSHDATA1 => cur.read_u8()? as u64,
        OP_PUSHDATA2 => u16::decode(&mut cur)? as u64,
        OP_PUSHDATA4 => cur.read_u32_le()? as u64,
        _ => match mode {
            PushMode::Strict => return Err(CodecError::InvalidPushOpcode { opcode: op, at: pos }),
            PushMode::Lenient => 0,
        },
    };

    Ok((len, cur.pos()))
}

/// Encodes the opcode and length field for pushing `len` bytes, using the
/// shortest valid form.
pub fn encode_push_length(len: usize) -> Result<Vec<u8>, CodecError> {
    let enc = PushEncoding::for_len(len).ok_or(CodecError::PayloadTooLarge(len))?;

    let mut out = Vec::with_capacity(enc.header_len());
    match enc {
        PushEncoding::Direct => out.push(len as u8),
        PushEncoding::PushData1 => {
            out.push(OP_PUSHDATA1);
            out.push(len as u8);
        }
        PushEncoding::PushData2 => {
            out.push(OP_PUSHDATA2);
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortest_encoding_boundaries() {
        let cases = [
            (0usize, vec![0x00]),
            (75, vec![75]),
            (76, vec![OP_PUSHDATA1, 76]),
            (255, vec![OP_PUSHDATA1, 0xff]),
            (256, vec![OP_PUSHDATA2, 0x00, 0x01]),
            (MAX_PUSH_LEN, vec![OP_PUSHDATA2, 0xff, 0xff]),
        ];

        for (len, exp) in cases {
            let hdr = encode_push_length(len).unwrap();
            assert_eq!(hdr, exp, "length {len}");

            let (decoded, next) = read_push_length(&hdr, 0).unwrap();
            assert_eq!(decoded, len as u64);
            assert_eq!(next, hdr.len());
        }
    }

    #[test]
    fn test_too_large() {
        assert_eq!(
            encode_push_length(MAX_PUSH_LEN + 1),
            Err(CodecError::PayloadTooLarge(MAX_PUSH_LEN + 1))
        );
        assert_eq!(PushEncoding::for_len(MAX_PUSH_LEN + 1), None);
    }

    #[test]
    fn test_pushdata4_read() {
        let buf = [0x00, OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(read_push_length(&buf, 1).unwrap(), (65536, 6));
    }

    #[test]
    fn test_strict_rejects_opcodes() {
        // OP_RETURN
        let buf = [0x6a];
        assert_eq!(
            read_push_length(&buf, 0),
            Err(CodecError::InvalidPushOpcode { opcode: 0x6a, at: 0 })
        );

        assert_eq!(read_push_length_with(&buf, 0, PushMode::Lenient), Ok((0, 1)));
    }

    #[test]
    fn test_truncated_length_field() {
        assert!(matches!(
            read_push_length(&[OP_PUSHDATA2, 0x01], 0),
            Err(CodecError::TruncatedInput { .. })
        ));
        assert!(matches!(read_push_length(&[], 0), Err(CodecError::TruncatedInput { .. })));
    }
}
