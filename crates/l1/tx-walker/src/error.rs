use thiserror::Error;

/// Errors from walking a raw transaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalkError {
    /// The input wasn't an even-length string of hex digits.
    #[error("malformed hex: {0}")]
    MalformedHex(#[from] hex::FromHexError),

    /// The buffer ended in the middle of a field.
    #[error("transaction truncated reading {field} at byte {offset}")]
    TruncatedTransaction {
        /// Label of the field that couldn't be read.
        field: String,
        /// Offset the field starts at.
        offset: usize,
    },

    /// There were bytes left over after the locktime.
    #[error("{count} unexpected bytes after locktime at byte {offset}")]
    TrailingBytes {
        /// Offset of the first extra byte.
        offset: usize,
        /// Number of extra bytes.
        count: usize,
    },
}
