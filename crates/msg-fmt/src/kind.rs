/// Message kind discriminant.
///
/// The codec carries the kind byte without interpreting the body grammar it
/// implies, this only names the well known values.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AnchorKind {
    /// UTF-8 text message.
    Text,

    /// Image bytes.
    Image,

    /// Any other kind byte.
    Other(u8),
}

impl AnchorKind {
    /// Returns the raw kind byte.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Text => 1,
            Self::Image => 4,
            Self::Other(v) => v,
        }
    }
}

impl From<u8> for AnchorKind {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::Text,
            4 => Self::Image,
            v => Self::Other(v),
        }
    }
}

impl From<AnchorKind> for u8 {
    fn from(k: AnchorKind) -> Self {
        k.as_u8()
    }
}
