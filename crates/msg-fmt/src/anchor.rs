use std::fmt;
use std::str;

use anchor_codec::impl_type_flat_struct;

/// Length of the txid prefix held by an anchor.
pub const TXID_PREFIX_LEN: usize = 8;

/// Encoded length of one anchor reference.
pub const ANCHOR_REF_LEN: usize = TXID_PREFIX_LEN + 1;

impl_type_flat_struct! {
    /// Compact back-reference to an output of an earlier transaction.
    ///
    /// Only the first [`TXID_PREFIX_LEN`] bytes of the txid are kept, taken in
    /// the order the txid is displayed, so resolving a reference against the
    /// chain may be ambiguous.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
    pub struct AnchorRef {
        #[cfg_attr(feature = "serde", serde(with = "hex"))]
        txid_prefix: [u8; TXID_PREFIX_LEN],
        vout: u8,
    }
}

const _: () = assert!(AnchorRef::WIRE_LEN == ANCHOR_REF_LEN);

impl AnchorRef {
    /// Builds a reference from the first bytes of a txid given in display
    /// order.
    pub fn from_display_txid(txid: &[u8; 32], vout: u8) -> Self {
        let mut txid_prefix = [0; TXID_PREFIX_LEN];
        txid_prefix.copy_from_slice(&txid[..TXID_PREFIX_LEN]);
        Self::new(txid_prefix, vout)
    }

    /// Checks if a txid in display order starts with our prefix.
    pub fn matches_display_txid(&self, txid: &[u8; 32]) -> bool {
        txid.starts_with(&self.txid_prefix)
    }
}

impl fmt::Display for AnchorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.txid_prefix {
            write!(f, "{b:02x}")?;
        }
        write!(f, ":{}", self.vout)
    }
}

/// Parses `<16 hex digits>:<vout>`.
impl str::FromStr for AnchorRef {
    type Err = InvalidAnchorRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, vout) = s.split_once(':').ok_or(InvalidAnchorRef)?;
        if prefix.len() != TXID_PREFIX_LEN * 2 || !prefix.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidAnchorRef);
        }

        let prefix = u64::from_str_radix(prefix, 16).map_err(|_| InvalidAnchorRef)?;
        let vout = vout.parse::<u8>().map_err(|_| InvalidAnchorRef)?;
        Ok(Self::new(prefix.to_be_bytes(), vout))
    }
}

/// Error parsing an [`AnchorRef`] from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidAnchorRef;

impl fmt::Display for InvalidAnchorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor must look like <16 hex digits>:<vout 0-255>")
    }
}

impl std::error::Error for InvalidAnchorRef {}
