//! Stamps carrier, a bare multisig output whose pubkeys are payload chunks.
//!
//! ```text
//! 51 (21 <33 byte chunk>)... 51 ae
//! ```
//!
//! The final chunk is zero padded on the right.  There's no length field, so
//! the padding is dropped by looking at where the payload's own structure
//! ends (see [`trim_zero_padding`]).

use anchor_msg_fmt::trim_zero_padding;
use bitcoin::{
    ScriptBuf,
    opcodes::all::{OP_CHECKMULTISIG, OP_PUSHBYTES_33, OP_PUSHNUM_1, OP_PUSHNUM_16},
    script::PushBytesBuf,
};

use crate::classify::CarrierMatch;
use crate::config::ParseConfig;
use crate::error::CarrierResult;
use crate::kind::CarrierKind;

/// Length of one fake compressed pubkey.
pub const STAMP_CHUNK_LEN: usize = 33;

/// A chunk plus its push opcode.
const PUSHED_CHUNK_LEN: usize = STAMP_CHUNK_LEN + 1;

/// Wraps an encoded payload as `OP_1 <chunk>... OP_1 OP_CHECKMULTISIG`.
pub fn wrap_stamps(payload: &[u8]) -> CarrierResult<ScriptBuf> {
    let mut builder = ScriptBuf::builder().push_opcode(OP_PUSHNUM_1);

    for chunk in payload.chunks(STAMP_CHUNK_LEN) {
        let mut key = [0u8; STAMP_CHUNK_LEN];
        key[..chunk.len()].copy_from_slice(chunk);
        builder = builder.push_slice(PushBytesBuf::try_from(key.to_vec())?);
    }

    Ok(builder
        .push_opcode(OP_PUSHNUM_1)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script())
}

/// Matches a stamps script whose reassembled chunks start with the magic.
///
/// The key count opcode may be `OP_1` or `OP_n` with `n` the number of
/// chunks.  The returned span runs from the first chunk's data to the end of
/// the last chunk, padding included, while the payload has the padding
/// trimmed.
pub fn unwrap_stamps(script: &[u8], config: &ParseConfig) -> Option<CarrierMatch> {
    let (&first, rest) = script.split_first()?;
    let (keys, &[n_op, checkmultisig]) = rest.split_last_chunk::<2>()?;

    if first != OP_PUSHNUM_1.to_u8() || checkmultisig != OP_CHECKMULTISIG.to_u8() {
        return None;
    }

    if keys.is_empty() || keys.len() % PUSHED_CHUNK_LEN != 0 {
        return None;
    }

    let chunk_count = keys.len() / PUSHED_CHUNK_LEN;
    if !key_count_matches(n_op, chunk_count) {
        return None;
    }

    let mut data = Vec::with_capacity(chunk_count * STAMP_CHUNK_LEN);
    for pushed in keys.chunks_exact(PUSHED_CHUNK_LEN) {
        if pushed[0] != OP_PUSHBYTES_33.to_u8() {
            return None;
        }
        data.extend_from_slice(&pushed[1..]);
    }

    if !config.magic_bytes().is_prefix_of(&data) {
        return None;
    }

    let payload = trim_zero_padding(&data, STAMP_CHUNK_LEN - 1).to_vec();
    // Skip OP_1 and the first push opcode, stop before OP_n OP_CHECKMULTISIG.
    let span = 2..script.len() - 2;

    Some(CarrierMatch::new(CarrierKind::Stamps, payload, span))
}

fn key_count_matches(n_op: u8, chunk_count: usize) -> bool {
    if n_op == OP_PUSHNUM_1.to_u8() {
        return true;
    }

    let n_range = OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8();
    n_range.contains(&n_op) && (n_op - OP_PUSHNUM_1.to_u8() + 1) as usize == chunk_count
}
