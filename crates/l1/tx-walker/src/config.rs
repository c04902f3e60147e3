use anchor_carrier::ParseConfig;

use crate::types::{PartialWalk, TxLayout, WalkResult};
use crate::walker::walk;

/// Config for walking transactions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalkConfig {
    /// How to recognize carriers in scripts and witness items.
    pub parse: ParseConfig,

    /// Whether to decode the payloads of matched carriers.  When off, the
    /// walker still reports where carriers are but leaves
    /// [`LocatedPayload::decoded`](crate::LocatedPayload::decoded) empty.
    pub decode_payloads: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            parse: ParseConfig::default(),
            decode_payloads: true,
        }
    }
}

impl WalkConfig {
    /// Constructs a new instance that decodes payloads.
    pub fn new(parse: ParseConfig) -> Self {
        Self {
            parse,
            decode_payloads: true,
        }
    }

    /// Returns a copy that only locates carriers.
    pub fn without_decoding(mut self) -> Self {
        self.decode_payloads = false;
        self
    }

    /// Walks a serialized transaction.
    ///
    /// # Errors
    ///
    /// On failure, everything read before the failing field is returned
    /// alongside the error.
    pub fn walk_bytes(&self, buf: &[u8]) -> WalkResult {
        walk(self, buf)
    }

    /// Walks a hex encoded transaction.  Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// [`WalkError::MalformedHex`](crate::WalkError::MalformedHex) with an
    /// empty layout if the string isn't valid hex, otherwise as
    /// [`Self::walk_bytes`].
    pub fn walk_hex(&self, hex: &str) -> WalkResult {
        match hex::decode(hex.trim()) {
            Ok(buf) => self.walk_bytes(&buf),
            Err(e) => Err(Box::new(PartialWalk::new(TxLayout::default(), e.into()))),
        }
    }
}
