use std::ops::Range;

use anchor_msg_fmt::{AnchorPayload, PayloadResult};
use tracing::trace;

use crate::annex::unwrap_annex;
use crate::config::ParseConfig;
use crate::inscription::unwrap_inscription;
use crate::kind::CarrierKind;
use crate::op_return::unwrap_op_return;
use crate::stamps::unwrap_stamps;
use crate::witness_data::unwrap_witness_data;

/// A candidate carrier, tagged with where it came from since that decides
/// which carriers are possible.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScriptOrWitnessItem<'a> {
    /// An output's `scriptPubKey`.
    OutputScript(&'a [u8]),

    /// One item of an input's witness stack.
    WitnessItem(&'a [u8]),
}

impl<'a> ScriptOrWitnessItem<'a> {
    /// Gets the raw bytes.
    pub fn bytes(&self) -> &'a [u8] {
        match self {
            Self::OutputScript(b) | Self::WitnessItem(b) => b,
        }
    }
}

/// A carrier recognized in a script or witness item.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CarrierMatch {
    kind: CarrierKind,
    payload: Vec<u8>,
    span: Range<usize>,
    content_type: Option<Vec<u8>>,
}

impl CarrierMatch {
    pub(crate) fn new(kind: CarrierKind, payload: Vec<u8>, span: Range<usize>) -> Self {
        Self {
            kind,
            payload,
            span,
            content_type: None,
        }
    }

    pub(crate) fn with_content_type(mut self, content_type: Vec<u8>) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Gets the carrier kind.
    pub fn kind(&self) -> CarrierKind {
        self.kind
    }

    /// Gets the payload bytes, reassembled if the carrier splits them.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Byte range of the payload within the script or item.  For chunked
    /// carriers this covers everything from the first payload byte to the
    /// last, so it also includes the push opcodes in between (and stamps
    /// padding).
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Gets the inscription content type, if this is an inscription.
    pub fn content_type(&self) -> Option<&[u8]> {
        self.content_type.as_deref()
    }

    /// Decodes the payload as a v1 ANCHOR payload.
    pub fn decode(&self) -> PayloadResult<AnchorPayload> {
        ParseConfig::default().decode(self)
    }

    /// Consumes the match, returning the payload bytes.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Determines which v1 carrier, if any, a script or witness item is.
///
/// Outputs are tried as `OP_RETURN` then stamps, witness items as
/// inscription, then annex, then witness data.  The first structural match
/// wins.
pub fn classify(item: ScriptOrWitnessItem<'_>) -> CarrierKind {
    ParseConfig::default().classify(item)
}

/// Like [`classify`], but also returns the payload bytes and where they are.
pub fn extract(item: ScriptOrWitnessItem<'_>) -> Option<CarrierMatch> {
    ParseConfig::default().extract(item)
}

pub(crate) fn extract_with(
    config: &ParseConfig,
    item: ScriptOrWitnessItem<'_>,
) -> Option<CarrierMatch> {
    let found = match item {
        ScriptOrWitnessItem::OutputScript(script) => {
            unwrap_op_return(script, config).or_else(|| unwrap_stamps(script, config))
        }
        ScriptOrWitnessItem::WitnessItem(item) => unwrap_inscription(item, config)
            .or_else(|| unwrap_annex(item, config))
            .or_else(|| unwrap_witness_data(item, config)),
    };

    trace!(
        len = item.bytes().len(),
        kind = %found.as_ref().map(|m| m.kind()).unwrap_or(CarrierKind::None),
        "classified carrier candidate"
    );

    found
}
