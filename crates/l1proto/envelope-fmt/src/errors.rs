use thiserror::Error;

/// Errors that can occur while parsing Bitcoin script envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeParseError {
    /// No `OP_FALSE OP_IF` pair carrying our protocol id in the script.
    #[error("no envelopes found in script")]
    NoEnvelopesFound,

    /// The script could not be split into instructions.
    #[error("malformed script")]
    MalformedScript,

    /// Missing the content type tag after the protocol id.
    #[error("missing content type field")]
    MissingContentType,

    /// Missing the empty push that marks the start of the body.
    #[error("missing body tag")]
    MissingBodyTag,

    /// The body contains an opcode other than a data push, or never reaches
    /// `OP_ENDIF`.
    #[error("invalid payload data")]
    InvalidPayload,
}

/// Errors that can occur while building Bitcoin script envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeBuildError {
    /// Failed to convert a payload chunk into `PushBytesBuf`.
    #[error("failed to convert {chunk_size} byte payload chunk to push bytes buffer")]
    PayloadChunkConversion {
        /// Size of the chunk that failed to convert.
        chunk_size: usize,
    },

    /// A header field is longer than a single stack element may be.
    #[error("envelope field of {0} bytes exceeds the stack element limit")]
    FieldTooLong(usize),
}
