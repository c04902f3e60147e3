use thiserror::Error;

use crate::magic::MagicBytes;

/// Errors from encoding or decoding ANCHOR payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PayloadError {
    /// The buffer did not start with the expected magic.
    #[error("bad magic (found {0})")]
    BadMagic(MagicBytes),

    /// The buffer ended before the header or the declared anchors.
    #[error("truncated payload (needed {needed} bytes, have {available})")]
    TruncatedInput {
        /// Bytes required by the header and declared anchor count.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// More anchors were given than the one byte count can express.
    #[error("too many anchors ({0}, max 255)")]
    TooManyAnchors(usize),
}

/// Wrapper result type.
pub type PayloadResult<T> = Result<T, PayloadError>;
