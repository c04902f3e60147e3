use anchor_envelope_fmt::errors::EnvelopeBuildError;
use bitcoin::script::PushBytesError;
use thiserror::Error;

/// Errors for wrapping payloads into carriers.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// The payload doesn't fit in the carrier.
    #[error("payload of {len} bytes exceeds the {max} byte carrier limit")]
    PayloadTooLarge {
        /// Length of the payload.
        len: usize,
        /// Largest payload the carrier takes.
        max: usize,
    },

    /// The inscription content type doesn't fit in a stack element.
    #[error("content type of {0} bytes is too long")]
    ContentTypeTooLong(usize),

    /// Error while building the inscription envelope.
    #[error("envelope: {0}")]
    Envelope(#[from] EnvelopeBuildError),

    /// Error while converting data to `PushByteBuf`, typically due to invalid length.
    #[error("pushbytes: {0}")]
    PushBytes(#[from] PushBytesError),
}

/// Wrapper result type.
pub type CarrierResult<T> = Result<T, CarrierError>;
