//! Structural walker over raw Bitcoin transactions.
//!
//! The walker consumes a serialized transaction field by field and labels
//! every byte range it reads, the way a hex viewer would want to highlight
//! them.  Output scripts and witness items are run through the carrier
//! classifier as they're read, and any ANCHOR payloads found are decoded and
//! reported with their position in the transaction.
//!
//! ```
//! # use anchor_tx_walker::walk_tx_hex;
//! // v1, no inputs or outputs, locktime 0
//! let layout = walk_tx_hex("01000000000000000000").unwrap();
//! assert_eq!(layout.segments().len(), 4);
//! assert!(layout.payloads().is_empty());
//! ```

mod config;
mod error;
#[cfg(feature = "serde")]
mod serde_hex;
mod types;
mod walker;

pub use config::WalkConfig;
pub use error::WalkError;
pub use types::{
    HexSegment, LocatedPayload, ParsedInput, ParsedOutput, ParsedTransaction, PartialWalk,
    PayloadLocation, SegmentCategory, TxLayout, WalkResult,
};
pub use walker::{walk_tx_bytes, walk_tx_hex};

#[cfg(test)]
use serde_json as _;
