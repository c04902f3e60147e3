//! Inscription carrier, a tagged `OP_FALSE OP_IF ... OP_ENDIF` envelope in a
//! tapscript.

use anchor_envelope_fmt::{builder::build_tagged_envelope, parser::parse_tagged_envelope};
use bitcoin::{Script, ScriptBuf, constants::MAX_SCRIPT_ELEMENT_SIZE};

use crate::classify::CarrierMatch;
use crate::config::{ANCHOR_PROTOCOL_ID, ParseConfig};
use crate::error::{CarrierError, CarrierResult};
use crate::kind::CarrierKind;

/// Tapscript carrying an inscription envelope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WitnessEnvelope {
    script: ScriptBuf,
}

impl WitnessEnvelope {
    /// Gets the tapscript.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Gets the raw script bytes, as they'd sit in the witness stack.
    pub fn as_bytes(&self) -> &[u8] {
        self.script.as_bytes()
    }

    /// Converts into the tapscript.
    pub fn into_script(self) -> ScriptBuf {
        self.script
    }
}

/// Wraps an encoded payload in a v1 inscription envelope.
///
/// # Errors
///
/// [`CarrierError::ContentTypeTooLong`] if the content type is over 520
/// bytes.
pub fn wrap_inscription(payload: &[u8], content_type: &[u8]) -> CarrierResult<WitnessEnvelope> {
    wrap_inscription_with(ANCHOR_PROTOCOL_ID, payload, content_type)
}

pub(crate) fn wrap_inscription_with(
    protocol_id: &[u8],
    payload: &[u8],
    content_type: &[u8],
) -> CarrierResult<WitnessEnvelope> {
    if content_type.len() > MAX_SCRIPT_ELEMENT_SIZE {
        return Err(CarrierError::ContentTypeTooLong(content_type.len()));
    }

    let script = build_tagged_envelope(protocol_id, content_type, payload)?;
    Ok(WitnessEnvelope { script })
}

/// Matches a tapscript holding our envelope whose body starts with the magic.
pub fn unwrap_inscription(item: &[u8], config: &ParseConfig) -> Option<CarrierMatch> {
    let env = parse_tagged_envelope(Script::from_bytes(item), config.protocol_id()).ok()?;
    if !config.magic_bytes().is_prefix_of(env.body()) {
        return None;
    }

    let span = env.body_span();
    let content_type = env.content_type().to_vec();
    Some(
        CarrierMatch::new(CarrierKind::Inscription, env.into_body(), span)
            .with_content_type(content_type),
    )
}
