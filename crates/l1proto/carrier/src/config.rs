use std::borrow::Cow;

use anchor_msg_fmt::{ANCHOR_MAGIC, AnchorPayload, MagicBytes, PayloadResult, decode_payload_with_magic};

use crate::classify::{CarrierMatch, ScriptOrWitnessItem, extract_with};
use crate::error::CarrierResult;
use crate::inscription::{WitnessEnvelope, wrap_inscription_with};
use crate::kind::CarrierKind;

/// Protocol id pushed at the start of v1 inscription envelopes.
pub const ANCHOR_PROTOCOL_ID: &[u8] = b"anchor";

/// Config for recognizing carriers.
///
/// The default is the v1 protocol, other values are mostly useful for
/// testnets and tests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseConfig {
    magic_bytes: MagicBytes,
    protocol_id: Cow<'static, [u8]>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            magic_bytes: ANCHOR_MAGIC,
            protocol_id: Cow::Borrowed(ANCHOR_PROTOCOL_ID),
        }
    }
}

impl ParseConfig {
    /// Constructs a new instance.
    pub fn new(magic_bytes: MagicBytes, protocol_id: impl Into<Vec<u8>>) -> Self {
        Self {
            magic_bytes,
            protocol_id: Cow::Owned(protocol_id.into()),
        }
    }

    /// Gets the magic payloads are expected to start with.
    pub fn magic_bytes(&self) -> MagicBytes {
        self.magic_bytes
    }

    /// Gets the inscription protocol id.
    pub fn protocol_id(&self) -> &[u8] {
        &self.protocol_id
    }

    /// Determines which carrier, if any, a script or witness item is.
    pub fn classify(&self, item: ScriptOrWitnessItem<'_>) -> CarrierKind {
        self.extract(item)
            .map(|m| m.kind())
            .unwrap_or(CarrierKind::None)
    }

    /// Matches a script or witness item against the carriers valid in its
    /// position and extracts the payload bytes of the first match.
    pub fn extract(&self, item: ScriptOrWitnessItem<'_>) -> Option<CarrierMatch> {
        extract_with(self, item)
    }

    /// Decodes the payload of a match, checking it against our magic.
    pub fn decode(&self, m: &CarrierMatch) -> PayloadResult<AnchorPayload> {
        decode_payload_with_magic(self.magic_bytes, m.payload())
    }

    /// Wraps a payload in an inscription envelope tagged with our protocol
    /// id.
    pub fn wrap_inscription(
        &self,
        payload: &[u8],
        content_type: &[u8],
    ) -> CarrierResult<WitnessEnvelope> {
        wrap_inscription_with(&self.protocol_id, payload, content_type)
    }
}
