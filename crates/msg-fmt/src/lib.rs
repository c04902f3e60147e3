//! Implements the ANCHOR typed message envelope.
//!
//! An ANCHOR payload is carrier-independent and laid out as:
//!
//! ```text
//! [0..4]         magic, A1 1C 00 01 for v1
//! [4]            kind (u8)
//! [5]            anchor count n (u8)
//! [6..6+9n]      n anchors, each an 8 byte txid prefix then a 1 byte vout
//! [6+9n..]       body, running to the end of the buffer
//! ```
//!
//! The body has no length prefix, whatever is left after the anchors belongs
//! to it.

#[cfg(feature = "arbitrary")]
mod arbitrary;
mod anchor;
mod error;
mod kind;
mod magic;
mod payload;
#[cfg(feature = "serde")]
mod serde;

pub use anchor::{ANCHOR_REF_LEN, AnchorRef, InvalidAnchorRef, TXID_PREFIX_LEN};
pub use error::{PayloadError, PayloadResult};
pub use kind::AnchorKind;
pub use magic::{ANCHOR_MAGIC, InvalidMagicBytes, MAGIC_BYTES_LEN, MagicBytes};
pub use payload::{
    AnchorPayload, MAX_ANCHORS, MIN_PAYLOAD_LEN, Payload, PayloadRef, decode_payload,
    decode_payload_with_magic, encode_payload, encode_payload_with_magic, header_len,
    trim_zero_padding,
};

#[cfg(test)]
use serde_json as _;
