use std::ops::Range;

use anchor_carrier::{CarrierKind, CarrierMatch};
use anchor_msg_fmt::{AnchorPayload, PayloadError};
use bitcoin::Txid;
use thiserror::Error;

use crate::error::WalkError;

/// Result of a walk.  The error side keeps whatever was read before the walk
/// stopped.
pub type WalkResult = Result<TxLayout, Box<PartialWalk>>;

/// What part of a transaction a segment belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SegmentCategory {
    /// Version, segwit marker, counts and locktime.
    Structure,

    /// A field of an input.
    Input,

    /// A field of an output.
    Output,

    /// A field of a witness stack.
    Witness,

    /// The bytes of an ANCHOR payload inside a carrier.
    AnchorPayload,
}

/// A labeled byte range of a raw transaction.
///
/// Top level segments tile the transaction.  Payload segments sit in
/// `nested` under the script or witness item segment they were found in.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexSegment {
    range: Range<usize>,
    category: SegmentCategory,
    label: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    nested: Vec<HexSegment>,
}

impl HexSegment {
    pub(crate) fn new(range: Range<usize>, category: SegmentCategory, label: String) -> Self {
        Self {
            range,
            category,
            label,
            nested: Vec::new(),
        }
    }

    pub(crate) fn push_nested(&mut self, seg: HexSegment) {
        self.nested.push(seg);
    }

    /// Byte range in the transaction.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Gets the category.
    pub fn category(&self) -> SegmentCategory {
        self.category
    }

    /// Gets the label, like `"Output 2: ScriptPubKey"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Segments inside this one.
    pub fn nested(&self) -> &[HexSegment] {
        &self.nested
    }

    /// Slices the bytes this segment covers out of the transaction.
    pub fn bytes<'b>(&self, tx: &'b [u8]) -> Option<&'b [u8]> {
        tx.get(self.range.clone())
    }
}

/// A transaction input.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedInput {
    /// Txid of the spent output, in serialization (internal) byte order.
    #[cfg_attr(feature = "serde", serde(with = "hex"))]
    pub prev_txid: [u8; 32],

    /// Index of the spent output.
    pub prev_vout: u32,

    /// Unlocking script.
    #[cfg_attr(feature = "serde", serde(with = "hex"))]
    pub script_sig: Vec<u8>,

    /// Witness stack, empty for non-segwit transactions.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_hex::list"))]
    pub witness: Vec<Vec<u8>>,

    /// Sequence number.
    pub sequence: u32,
}

/// A transaction output.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedOutput {
    /// Value in satoshis.
    pub value_sats: u64,

    /// Locking script.
    #[cfg_attr(feature = "serde", serde(with = "hex"))]
    pub script_pubkey: Vec<u8>,
}

/// A transaction broken into its fields.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedTransaction {
    /// Version, read as unsigned.
    pub version: u32,

    /// Whether the segwit marker was present.
    pub is_segwit: bool,

    /// Inputs, with their witnesses attached.
    pub inputs: Vec<ParsedInput>,

    /// Outputs.
    pub outputs: Vec<ParsedOutput>,

    /// Locktime.
    pub locktime: u32,
}

/// Where a carrier was found.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PayloadLocation {
    /// In an output's `scriptPubKey`.
    Output {
        /// Output index.
        index: usize,
    },

    /// In an input's witness stack.
    Witness {
        /// Input index.
        input: usize,
        /// Index of the item within the stack.
        item: usize,
    },
}

/// A carrier found by the walker, along with its payload.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocatedPayload {
    carrier: CarrierKind,
    location: PayloadLocation,
    range: Range<usize>,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_hex::option"))]
    content_type: Option<Vec<u8>>,
    #[cfg_attr(feature = "serde", serde(with = "hex"))]
    raw: Vec<u8>,
    decoded: Option<Result<AnchorPayload, PayloadError>>,
}

impl LocatedPayload {
    pub(crate) fn new(
        m: CarrierMatch,
        location: PayloadLocation,
        range: Range<usize>,
        decoded: Option<Result<AnchorPayload, PayloadError>>,
    ) -> Self {
        Self {
            carrier: m.kind(),
            location,
            range,
            content_type: m.content_type().map(<[u8]>::to_vec),
            raw: m.into_payload(),
            decoded,
        }
    }

    /// Gets the carrier kind.
    pub fn carrier(&self) -> CarrierKind {
        self.carrier
    }

    /// Gets where the carrier is.
    pub fn location(&self) -> PayloadLocation {
        self.location
    }

    /// Byte range of the payload in the transaction.  For chunked carriers
    /// this includes the push opcodes between chunks.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Gets the inscription content type, if any.
    pub fn content_type(&self) -> Option<&[u8]> {
        self.content_type.as_deref()
    }

    /// Gets the payload bytes as reassembled from the carrier.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Gets the decode result, or `None` if decoding was turned off.
    pub fn decoded(&self) -> Option<Result<&AnchorPayload, &PayloadError>> {
        self.decoded.as_ref().map(Result::as_ref)
    }

    /// Gets the payload if it decoded successfully.
    pub fn payload(&self) -> Option<&AnchorPayload> {
        self.decoded()?.ok()
    }
}

/// Everything a walk produced.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxLayout {
    tx: ParsedTransaction,
    segments: Vec<HexSegment>,
    payloads: Vec<LocatedPayload>,
    txid: Option<Txid>,
}

impl TxLayout {
    pub(crate) fn new(
        tx: ParsedTransaction,
        segments: Vec<HexSegment>,
        payloads: Vec<LocatedPayload>,
        txid: Option<Txid>,
    ) -> Self {
        Self {
            tx,
            segments,
            payloads,
            txid,
        }
    }

    /// Gets the parsed transaction.
    pub fn tx(&self) -> &ParsedTransaction {
        &self.tx
    }

    /// Top level segments, in byte order.
    pub fn segments(&self) -> &[HexSegment] {
        &self.segments
    }

    /// Carriers found, in the order they appear.
    pub fn payloads(&self) -> &[LocatedPayload] {
        &self.payloads
    }

    /// Txid, only set once the whole transaction has been read.
    pub fn txid(&self) -> Option<Txid> {
        self.txid
    }

    /// Number of bytes covered by the segments.
    pub fn consumed(&self) -> usize {
        self.segments.last().map_or(0, |s| s.range.end)
    }

    /// Finds the top level segment covering a byte.
    pub fn segment_at(&self, offset: usize) -> Option<&HexSegment> {
        let idx = self.segments.partition_point(|s| s.range.end <= offset);
        self.segments.get(idx).filter(|s| s.range.contains(&offset))
    }
}

/// A walk that stopped early, with what was read up to that point.
#[derive(Debug, Error)]
#[error("walk stopped after {} bytes: {error}", .layout.consumed())]
pub struct PartialWalk {
    layout: TxLayout,
    error: WalkError,
}

impl PartialWalk {
    pub(crate) fn new(layout: TxLayout, error: WalkError) -> Self {
        Self { layout, error }
    }

    /// Gets the partial layout.  There's no txid.
    pub fn layout(&self) -> &TxLayout {
        &self.layout
    }

    /// Gets the error the walk stopped on.
    pub fn error(&self) -> &WalkError {
        &self.error
    }

    /// Splits into the partial layout and the error.
    pub fn into_parts(self) -> (TxLayout, WalkError) {
        (self.layout, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(range: Range<usize>) -> HexSegment {
        HexSegment::new(range, SegmentCategory::Structure, String::new())
    }

    #[test]
    fn test_segment_at() {
        let layout = TxLayout::new(
            ParsedTransaction::default(),
            vec![seg(0..4), seg(4..5), seg(5..5), seg(5..9)],
            Vec::new(),
            None,
        );

        assert_eq!(layout.segment_at(0).unwrap().range(), 0..4);
        assert_eq!(layout.segment_at(3).unwrap().range(), 0..4);
        assert_eq!(layout.segment_at(4).unwrap().range(), 4..5);
        assert_eq!(layout.segment_at(5).unwrap().range(), 5..9);
        assert!(layout.segment_at(9).is_none());
        assert_eq!(layout.consumed(), 9);
    }
}
