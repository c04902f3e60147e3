use thiserror::Error;

/// Errors from anchor-codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// If we tried to read past the end of the underlying buffer.
    #[error("truncated input (needed {needed} bytes at offset {at}, {remaining} left)")]
    TruncatedInput {
        /// Offset the read started at.
        at: usize,
        /// Number of bytes the read wanted.
        needed: usize,
        /// Number of bytes that were actually left.
        remaining: usize,
    },

    /// A byte that is not a data push was found where strict push decoding
    /// was requested.
    #[error("invalid push opcode {opcode:#04x} at offset {at}")]
    InvalidPushOpcode {
        /// The offending opcode.
        opcode: u8,
        /// Offset of the opcode.
        at: usize,
    },

    /// A push length that no push opcode we emit can express.
    #[error("payload of {0} bytes is too large to push")]
    PayloadTooLarge(usize),

    /// If there was extra data in a buffer than we didn't consume reading a
    /// message.
    #[error("extra unnecessary input leftover")]
    ExtraInput,
}

/// Wrapper result type.
pub type CodecResult<T> = Result<T, CodecError>;
