//! The walk itself, a single forward pass over the buffer:
//!
//! ```text
//! version [marker flag] #inputs inputs... #outputs outputs... [witnesses...] locktime
//! ```

use anchor_carrier::{ANNEX_TAG, ScriptOrWitnessItem};
use anchor_codec::{ByteCursor, CodecResult, Decoder};
use bitcoin::{
    Txid,
    hashes::{Hash, sha256d},
};
use tracing::*;

use crate::config::WalkConfig;
use crate::error::WalkError;
use crate::types::{
    HexSegment, LocatedPayload, ParsedInput, ParsedOutput, ParsedTransaction, PartialWalk,
    PayloadLocation, SegmentCategory, TxLayout, WalkResult,
};

/// Marker and flag bytes that follow the version in segwit serialization.
const SEGWIT_MARKER: [u8; 2] = [0x00, 0x01];

/// Walks a hex encoded transaction with the v1 carrier config.
///
/// # Errors
///
/// See [`WalkConfig::walk_hex`].
pub fn walk_tx_hex(hex: &str) -> WalkResult {
    WalkConfig::default().walk_hex(hex)
}

/// Walks a serialized transaction with the v1 carrier config.
///
/// # Errors
///
/// See [`WalkConfig::walk_bytes`].
pub fn walk_tx_bytes(buf: &[u8]) -> WalkResult {
    WalkConfig::default().walk_bytes(buf)
}

pub(crate) fn walk(config: &WalkConfig, buf: &[u8]) -> WalkResult {
    let mut walker = Walker::new(config, buf);
    match walker.run() {
        Ok(txid) => {
            debug!(
                %txid,
                len = buf.len(),
                segments = walker.segments.len(),
                payloads = walker.payloads.len(),
                "walked transaction"
            );
            Ok(walker.into_layout(Some(txid)))
        }
        Err(error) => {
            warn!(%error, "transaction walk stopped early");
            Err(Box::new(PartialWalk::new(walker.into_layout(None), error)))
        }
    }
}

/// Converts a length read off the wire.  Values that don't fit are clamped,
/// the following read then reports truncation.
fn as_len(v: u64) -> usize {
    usize::try_from(v).unwrap_or(usize::MAX)
}

struct Walker<'c, 'b> {
    config: &'c WalkConfig,
    buf: &'b [u8],
    cur: ByteCursor<'b>,
    tx: ParsedTransaction,
    segments: Vec<HexSegment>,
    payloads: Vec<LocatedPayload>,
}

impl<'c, 'b> Walker<'c, 'b> {
    fn new(config: &'c WalkConfig, buf: &'b [u8]) -> Self {
        Self {
            config,
            buf,
            cur: ByteCursor::new(buf),
            tx: ParsedTransaction::default(),
            segments: Vec::new(),
            payloads: Vec::new(),
        }
    }

    fn into_layout(self, txid: Option<Txid>) -> TxLayout {
        TxLayout::new(self.tx, self.segments, self.payloads, txid)
    }

    fn run(&mut self) -> Result<Txid, WalkError> {
        use SegmentCategory::Structure;

        self.tx.version = self.read_field(Structure, "Version", ByteCursor::read_u32_le)?;

        if self.cur.peek_arr::<2>() == Some(SEGWIT_MARKER) {
            self.read_field(Structure, "Segwit Marker & Flag", |c: &mut ByteCursor<'b>| {
                c.read_slice(2)
            })?;
            self.tx.is_segwit = true;
        }

        // Everything from here up to the witnesses goes into the txid.
        let body_start = self.cur.pos();

        let n_inputs = self.read_field(Structure, "Input Count", ByteCursor::read_compact_size)?;
        for i in 0..as_len(n_inputs) {
            self.read_input(i)?;
        }

        let n_outputs = self.read_field(Structure, "Output Count", ByteCursor::read_compact_size)?;
        for i in 0..as_len(n_outputs) {
            self.read_output(i)?;
        }

        let body_end = self.cur.pos();

        if self.tx.is_segwit {
            for i in 0..self.tx.inputs.len() {
                self.read_witness(i)?;
            }
        }

        let locktime_start = self.cur.pos();
        self.tx.locktime = self.read_field(Structure, "Locktime", ByteCursor::read_u32_le)?;

        let count = self.cur.remaining();
        if count > 0 {
            // Still label the extra bytes so the partial layout covers them.
            let offset = self.cur.pos();
            self.read_field(Structure, "Trailing Data", |c: &mut ByteCursor<'b>| {
                c.read_slice(count)
            })?;
            return Err(WalkError::TrailingBytes { offset, count });
        }

        let mut stripped = Vec::with_capacity(body_end - body_start + 8);
        stripped.extend_from_slice(&self.buf[..4]);
        stripped.extend_from_slice(&self.buf[body_start..body_end]);
        stripped.extend_from_slice(&self.buf[locktime_start..]);

        Ok(Txid::from_raw_hash(sha256d::Hash::hash(&stripped)))
    }

    fn read_input(&mut self, i: usize) -> Result<(), WalkError> {
        use SegmentCategory::Input;

        let label = |field: &str| format!("Input {i}: {field}");

        let prev_txid = self.read_field(Input, label("Previous Txid"), |c: &mut ByteCursor<'b>| {
            c.read_arr::<32>()
        })?;
        let prev_vout = self.read_field(Input, label("Previous Vout"), ByteCursor::read_u32_le)?;
        let script_len =
            self.read_field(Input, label("ScriptSig Length"), ByteCursor::read_compact_size)?;
        let script_sig = self.read_field(Input, label("ScriptSig"), |c: &mut ByteCursor<'b>| {
            c.read_slice(as_len(script_len))
        })?;
        let sequence = self.read_field(Input, label("Sequence"), ByteCursor::read_u32_le)?;

        self.tx.inputs.push(ParsedInput {
            prev_txid,
            prev_vout,
            script_sig: script_sig.to_vec(),
            witness: Vec::new(),
            sequence,
        });

        Ok(())
    }

    fn read_output(&mut self, i: usize) -> Result<(), WalkError> {
        use SegmentCategory::Output;

        let prefix = format!("Output {i}");

        let value_sats =
            self.read_field(Output, format!("{prefix}: Value"), ByteCursor::read_u64_le)?;
        let script_len = self.read_field(
            Output,
            format!("{prefix}: ScriptPubKey Length"),
            ByteCursor::read_compact_size,
        )?;

        let start = self.cur.pos();
        let script = self.read_field(
            Output,
            format!("{prefix}: ScriptPubKey"),
            |c: &mut ByteCursor<'b>| c.read_slice(as_len(script_len)),
        )?;

        self.locate(
            ScriptOrWitnessItem::OutputScript(script),
            start,
            PayloadLocation::Output { index: i },
            &prefix,
        );

        self.tx.outputs.push(ParsedOutput {
            value_sats,
            script_pubkey: script.to_vec(),
        });

        Ok(())
    }

    fn read_witness(&mut self, input: usize) -> Result<(), WalkError> {
        use SegmentCategory::Witness;

        let n_items = self.read_field(
            Witness,
            format!("Witness {input}: Item Count"),
            ByteCursor::read_compact_size,
        )?;
        let n_items = as_len(n_items);

        for item in 0..n_items {
            let prefix = format!("Witness {input} Item {item}");

            let len = self.read_field(
                Witness,
                format!("{prefix}: Length"),
                ByteCursor::read_compact_size,
            )?;

            // The annex can only be the last item, and only if something
            // precedes it.
            let is_annex = n_items >= 2
                && item + 1 == n_items
                && len > 0
                && self.cur.rest().first() == Some(&ANNEX_TAG);
            let name = if is_annex { "Annex" } else { "Data" };

            let start = self.cur.pos();
            let data = self.read_field(
                Witness,
                format!("{prefix}: {name}"),
                |c: &mut ByteCursor<'b>| c.read_slice(as_len(len)),
            )?;

            self.locate(
                ScriptOrWitnessItem::WitnessItem(data),
                start,
                PayloadLocation::Witness { input, item },
                &prefix,
            );

            self.tx.inputs[input].witness.push(data.to_vec());
        }

        Ok(())
    }

    /// Reads one field and records a segment for it.
    fn read_field<T>(
        &mut self,
        category: SegmentCategory,
        label: impl Into<String>,
        read: impl FnOnce(&mut ByteCursor<'b>) -> CodecResult<T>,
    ) -> Result<T, WalkError> {
        let label = label.into();
        let start = self.cur.pos();

        let v = read(&mut self.cur).map_err(|e| {
            trace!(%label, start, %e, "field ran past the end");
            WalkError::TruncatedTransaction {
                field: label.clone(),
                offset: start,
            }
        })?;

        let end = self.cur.pos();
        trace!(%label, start, end, "read field");
        self.segments.push(HexSegment::new(start..end, category, label));

        Ok(v)
    }

    /// Runs the classifier on a script or witness item that starts at `base`
    /// and records what it finds.
    fn locate(
        &mut self,
        item: ScriptOrWitnessItem<'_>,
        base: usize,
        location: PayloadLocation,
        prefix: &str,
    ) {
        let Some(m) = self.config.parse.extract(item) else {
            return;
        };

        let span = m.span();
        let range = base + span.start..base + span.end;
        debug!(carrier = %m.kind(), ?location, ?range, "found carrier");

        let decoded = self.config.decode_payloads.then(|| self.config.parse.decode(&m));
        if let Some(Err(e)) = &decoded {
            warn!(carrier = %m.kind(), ?location, %e, "carrier payload failed to decode");
        }

        if let Some(parent) = self.segments.last_mut() {
            parent.push_nested(HexSegment::new(
                range.clone(),
                SegmentCategory::AnchorPayload,
                format!("{prefix}: ANCHOR Payload ({})", m.kind()),
            ));
        }

        self.payloads
            .push(LocatedPayload::new(m, location, range, decoded));
    }
}

#[cfg(test)]
mod tests {
    use anchor_carrier::CarrierKind;
    use anchor_msg_fmt::{Payload, encode_payload};
    use proptest::prelude::*;

    use super::*;

    /// Checks the top level segments tile `buf[..consumed]` in order.
    fn assert_tiled(layout: &TxLayout) {
        let mut at = 0;
        for seg in layout.segments() {
            assert_eq!(seg.range().start, at, "gap or overlap at {}", seg.label());
            at = seg.range().end;
        }
        assert_eq!(at, layout.consumed());
    }

    fn labels(layout: &TxLayout) -> Vec<&str> {
        layout.segments().iter().map(|s| s.label()).collect()
    }

    /// One legacy input, one OP_RETURN output carrying "hi".
    fn legacy_tx_hex() -> String {
        let mut hex = String::new();
        hex += "02000000"; // version
        hex += "01"; // input count
        hex += &"11".repeat(32); // prev txid
        hex += "03000000"; // prev vout
        hex += "00"; // empty scriptsig
        hex += "ffffffff"; // sequence
        hex += "01"; // output count
        hex += "0000000000000000"; // value
        hex += "0a6a08a11c000101006869"; // OP_RETURN "hi"
        hex += "00000000"; // locktime
        hex
    }

    #[test]
    fn test_legacy_op_return() {
        let hex = legacy_tx_hex();
        let layout = walk_tx_hex(&hex).unwrap();

        assert_eq!(
            labels(&layout),
            [
                "Version",
                "Input Count",
                "Input 0: Previous Txid",
                "Input 0: Previous Vout",
                "Input 0: ScriptSig Length",
                "Input 0: ScriptSig",
                "Input 0: Sequence",
                "Output Count",
                "Output 0: Value",
                "Output 0: ScriptPubKey Length",
                "Output 0: ScriptPubKey",
                "Locktime",
            ]
        );
        assert_tiled(&layout);
        assert_eq!(layout.consumed(), hex.len() / 2);

        let tx = layout.tx();
        assert_eq!(tx.version, 2);
        assert!(!tx.is_segwit);
        assert_eq!(tx.inputs[0].prev_txid, [0x11; 32]);
        assert_eq!(tx.inputs[0].prev_vout, 3);
        assert_eq!(tx.inputs[0].sequence, u32::MAX);
        assert!(tx.inputs[0].script_sig.is_empty());
        assert_eq!(tx.outputs[0].value_sats, 0);

        let [found] = layout.payloads() else {
            panic!("expected one payload");
        };
        assert_eq!(found.carrier(), CarrierKind::OpReturn);
        assert_eq!(found.location(), PayloadLocation::Output { index: 0 });
        assert_eq!(found.payload().unwrap().body(), b"hi");

        // The nested segment covers the payload bytes after OP_RETURN and the
        // push opcode.
        let script_seg = layout.segment_at(found.range().start).unwrap();
        assert_eq!(script_seg.label(), "Output 0: ScriptPubKey");
        assert_eq!(script_seg.range().start + 2, found.range().start);
        let nested = &script_seg.nested()[0];
        assert_eq!(nested.category(), SegmentCategory::AnchorPayload);
        assert_eq!(nested.label(), "Output 0: ANCHOR Payload (OP_RETURN)");
        assert_eq!(nested.range(), found.range());
    }

    #[test]
    fn test_segwit_witness_and_annex() {
        let payload = encode_payload(1, &[], b"annexed").unwrap();

        let mut buf = hex::decode("01000000").unwrap();
        buf.extend_from_slice(&[0x00, 0x01, 0x01]);
        buf.extend_from_slice(&[0x22; 32]);
        buf.extend_from_slice(&[0, 0, 0, 0, 0x00, 0xfd, 0xff, 0xff, 0xff]);
        buf.extend_from_slice(&[0x01, 0xe8, 0x03, 0, 0, 0, 0, 0, 0, 0x00]);

        // Witness: a signature and the annex.
        buf.extend_from_slice(&[0x02, 0x40]);
        buf.extend_from_slice(&[0x33; 64]);
        buf.push(u8::try_from(payload.len() + 1).unwrap());
        buf.push(0x50);
        buf.extend_from_slice(&payload);
        buf.extend_from_slice(&[0; 4]);

        let layout = walk_tx_bytes(&buf).unwrap();
        assert_tiled(&layout);
        assert_eq!(layout.consumed(), buf.len());
        assert!(layout.tx().is_segwit);
        assert_eq!(layout.tx().inputs[0].witness.len(), 2);
        assert_eq!(layout.tx().outputs[0].value_sats, 1000);

        let labels = labels(&layout);
        assert_eq!(labels[1], "Segwit Marker & Flag");
        assert!(labels.contains(&"Witness 0 Item 0: Data"));
        assert!(labels.contains(&"Witness 0 Item 1: Annex"));

        let [found] = layout.payloads() else {
            panic!("expected one payload");
        };
        assert_eq!(found.carrier(), CarrierKind::TaprootAnnex);
        assert_eq!(found.location(), PayloadLocation::Witness { input: 0, item: 1 });
        assert_eq!(&buf[found.range()], &payload[..]);
    }

    #[test]
    fn test_lone_annex_tag_is_data() {
        // A single 0x50 item isn't an annex.
        let mut buf = hex::decode("01000000").unwrap();
        buf.extend_from_slice(&[0x00, 0x01, 0x01]);
        buf.extend_from_slice(&[0x22; 32]);
        buf.extend_from_slice(&[0, 0, 0, 0, 0x00, 0xff, 0xff, 0xff, 0xff, 0x00]);
        buf.extend_from_slice(&[0x01, 0x02, 0x50, 0x01]);
        buf.extend_from_slice(&[0; 4]);

        let layout = walk_tx_bytes(&buf).unwrap();
        assert!(labels(&layout).contains(&"Witness 0 Item 0: Data"));
    }

    #[test]
    fn test_truncated_keeps_progress() {
        let hex = legacy_tx_hex();
        // Drop the last two bytes of the locktime.
        let err = walk_tx_hex(&hex[..hex.len() - 4]).unwrap_err();

        let (layout, error) = err.into_parts();
        assert_eq!(
            error,
            WalkError::TruncatedTransaction {
                field: "Locktime".to_owned(),
                offset: hex.len() / 2 - 4,
            }
        );
        assert_tiled(&layout);
        assert_eq!(layout.payloads().len(), 1);
        assert_eq!(layout.tx().outputs.len(), 1);
        assert!(layout.txid().is_none());
    }

    #[test]
    fn test_empty_input() {
        let err = walk_tx_bytes(&[]).unwrap_err();
        assert!(matches!(
            err.error(),
            WalkError::TruncatedTransaction { field, offset: 0 } if field == "Version"
        ));
        assert!(err.layout().segments().is_empty());
    }

    #[test]
    fn test_malformed_hex() {
        for bad in ["0", "zz", "0100000g"] {
            let err = walk_tx_hex(bad).unwrap_err();
            assert!(matches!(err.error(), WalkError::MalformedHex(_)), "{bad}");
            assert!(err.layout().segments().is_empty());
        }
    }

    #[test]
    fn test_trailing_bytes() {
        let hex = legacy_tx_hex() + "beef";
        let err = walk_tx_hex(&hex).unwrap_err();

        let offset = hex.len() / 2 - 2;
        assert_eq!(err.error(), &WalkError::TrailingBytes { offset, count: 2 });
        assert_tiled(err.layout());
        assert_eq!(err.layout().consumed(), hex.len() / 2);
    }

    #[test]
    fn test_without_decoding() {
        let config = WalkConfig::default().without_decoding();
        let layout = config.walk_hex(&legacy_tx_hex()).unwrap();

        let found = &layout.payloads()[0];
        assert_eq!(found.carrier(), CarrierKind::OpReturn);
        assert!(found.decoded().is_none());
        assert_eq!(found.raw(), hex::decode("a11c000101006869").unwrap());
    }

    #[test]
    fn test_undecodable_payload_is_reported() {
        // Magic and a claimed anchor that isn't there.
        let hex = legacy_tx_hex().replace("0a6a08a11c000101006869", "0a6a08a11c000101016869");
        let layout = walk_tx_hex(&hex).unwrap();

        let found = &layout.payloads()[0];
        assert!(matches!(found.decoded(), Some(Err(_))));
        assert!(found.payload().is_none());
    }

    proptest! {
        #[test]
        fn prop_segments_tile_any_input(buf in proptest::collection::vec(any::<u8>(), 0..400)) {
            let layout = match walk_tx_bytes(&buf) {
                Ok(layout) => layout,
                Err(partial) => partial.into_parts().0,
            };

            let mut at = 0;
            for seg in layout.segments() {
                prop_assert_eq!(seg.range().start, at);
                at = seg.range().end;
            }
            prop_assert!(at <= buf.len());
        }
    }
}
