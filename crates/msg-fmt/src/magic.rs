use std::fmt;
use std::str;

use anchor_codec::impl_wrapper_codec;

/// Length of magic bytes in bytes.
pub const MAGIC_BYTES_LEN: usize = 4;

/// Magic of v1 ANCHOR payloads, `0xA11C0001`.
///
/// A future protocol version gets a new magic rather than a version field.
pub const ANCHOR_MAGIC: MagicBytes = MagicBytes::new([0xa1, 0x1c, 0x00, 0x01]);

/// Magic bytes identifier ([`MAGIC_BYTES_LEN`] raw bytes).
///
/// Displayed and parsed as 8 hex digits, since the v1 magic isn't printable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MagicBytes([u8; MAGIC_BYTES_LEN]);

impl_wrapper_codec!(MagicBytes => [u8; MAGIC_BYTES_LEN]);

impl MagicBytes {
    /// Creates a new `MagicBytes` from a [`MAGIC_BYTES_LEN`]-byte array.
    pub const fn new(bytes: [u8; MAGIC_BYTES_LEN]) -> Self {
        Self(bytes)
    }

    /// Reads the magic from the front of a buffer, if it is long enough.
    pub fn from_prefix(buf: &[u8]) -> Option<Self> {
        let bytes = buf.get(..MAGIC_BYTES_LEN)?.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Returns the magic bytes as a byte slice.
    pub const fn as_bytes(&self) -> &[u8; MAGIC_BYTES_LEN] {
        &self.0
    }

    /// Converts to the inner byte array.
    pub const fn into_inner(self) -> [u8; MAGIC_BYTES_LEN] {
        self.0
    }

    /// Checks if a buffer starts with exactly these bytes.
    pub fn is_prefix_of(&self, buf: &[u8]) -> bool {
        buf.starts_with(&self.0)
    }
}

impl From<[u8; MAGIC_BYTES_LEN]> for MagicBytes {
    fn from(bytes: [u8; MAGIC_BYTES_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<MagicBytes> for [u8; MAGIC_BYTES_LEN] {
    fn from(magic: MagicBytes) -> Self {
        magic.0
    }
}

impl AsRef<[u8]> for MagicBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for MagicBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl str::FromStr for MagicBytes {
    type Err = InvalidMagicBytes;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != MAGIC_BYTES_LEN * 2 {
            return Err(InvalidMagicBytes::InvalidLength);
        }
        if !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidMagicBytes::NotHex);
        }
        let v = u32::from_str_radix(s, 16).map_err(|_| InvalidMagicBytes::NotHex)?;
        Ok(Self(v.to_be_bytes()))
    }
}

/// Error type for invalid magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMagicBytes {
    /// The input string is not exactly [`MAGIC_BYTES_LEN`] bytes of hex.
    InvalidLength,
    /// The input string contains non-hex characters.
    NotHex,
}

impl fmt::Display for InvalidMagicBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength => write!(
                f,
                "magic bytes must be exactly {} hex digits",
                MAGIC_BYTES_LEN * 2
            ),
            Self::NotHex => write!(f, "magic bytes must be hex"),
        }
    }
}

impl std::error::Error for InvalidMagicBytes {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let magic: MagicBytes = "a11c0001".parse().unwrap();
        assert_eq!(magic, ANCHOR_MAGIC);

        let magic: MagicBytes = "0xA11C0001".parse().unwrap();
        assert_eq!(magic, ANCHOR_MAGIC);
    }

    #[test]
    fn test_from_str_invalid() {
        assert_eq!(
            "a11c00".parse::<MagicBytes>(),
            Err(InvalidMagicBytes::InvalidLength)
        );
        assert_eq!(
            "a11c000100".parse::<MagicBytes>(),
            Err(InvalidMagicBytes::InvalidLength)
        );
        assert_eq!("a11c00zz".parse::<MagicBytes>(), Err(InvalidMagicBytes::NotHex));
        assert_eq!("+11c0001".parse::<MagicBytes>(), Err(InvalidMagicBytes::NotHex));
    }

    #[test]
    fn test_display() {
        assert_eq!(ANCHOR_MAGIC.to_string(), "a11c0001");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(MagicBytes::from_prefix(&[0xa1, 0x1c, 0x00]), None);
        assert_eq!(
            MagicBytes::from_prefix(&[0xa1, 0x1c, 0x00, 0x01, 0x05]),
            Some(ANCHOR_MAGIC)
        );
        assert!(ANCHOR_MAGIC.is_prefix_of(&[0xa1, 0x1c, 0x00, 0x01]));
        assert!(!ANCHOR_MAGIC.is_prefix_of(&[0xa1, 0x1c, 0x00, 0x02]));
    }
}
