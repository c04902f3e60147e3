//! Plain witness data carrier.
//!
//! The payload is pushed by a tapscript that drops it again and leaves true
//! on the stack:
//!
//! ```text
//! <chunk_0> ... <chunk_n> OP_2DROP... [OP_DROP] OP_TRUE
//! ```
//!
//! A stack item that is just the payload itself is recognized too.

use std::ops::Range;

use anchor_codec::read_push_length;
use anchor_envelope_fmt::builder::push_chunks;
use bitcoin::{
    Script, ScriptBuf,
    constants::MAX_SCRIPT_ELEMENT_SIZE,
    opcodes::{
        OP_TRUE,
        all::{OP_2DROP, OP_DROP},
    },
    script::Instruction,
};

use crate::classify::CarrierMatch;
use crate::config::ParseConfig;
use crate::error::CarrierResult;
use crate::kind::CarrierKind;

/// Wraps an encoded payload in a push-and-drop tapscript.
pub fn wrap_witness_data(payload: &[u8]) -> CarrierResult<ScriptBuf> {
    let mut builder = push_chunks(ScriptBuf::builder(), payload)?;

    let pushes = payload.len().div_ceil(MAX_SCRIPT_ELEMENT_SIZE);
    for _ in 0..pushes / 2 {
        builder = builder.push_opcode(OP_2DROP);
    }
    if pushes % 2 == 1 {
        builder = builder.push_opcode(OP_DROP);
    }

    Ok(builder.push_opcode(OP_TRUE).into_script())
}

/// Matches a push-and-drop tapscript, or a bare item, that starts with the
/// magic.
pub fn unwrap_witness_data(item: &[u8], config: &ParseConfig) -> Option<CarrierMatch> {
    let (payload, span) = match parse_push_drop(item) {
        Some(found) => found,
        None => (item.to_vec(), 0..item.len()),
    };

    if !config.magic_bytes().is_prefix_of(&payload) {
        return None;
    }

    Some(CarrierMatch::new(CarrierKind::WitnessData, payload, span))
}

/// Parses `<push>+ (OP_2DROP|OP_DROP)* OP_TRUE` where the drops remove
/// exactly the pushed items.
fn parse_push_drop(item: &[u8]) -> Option<(Vec<u8>, Range<usize>)> {
    let script = Script::from_bytes(item);
    let mut instrs = script.instruction_indices().peekable();

    let mut data = Vec::new();
    let mut span: Option<Range<usize>> = None;
    let mut pushes = 0usize;

    while let Some(Ok((idx, Instruction::PushBytes(b)))) = instrs.peek() {
        let (idx, b) = (*idx, *b);
        if b.is_empty() {
            return None;
        }
        let (_, start) = read_push_length(item, idx).ok()?;
        let end = start + b.len();
        span = Some(span.map_or(start..end, |s| s.start..end));
        data.extend_from_slice(b.as_bytes());
        pushes += 1;
        instrs.next();
    }

    let mut dropped = 0usize;
    loop {
        match instrs.next()? {
            Ok((_, Instruction::Op(OP_2DROP))) => dropped += 2,
            Ok((_, Instruction::Op(OP_DROP))) => dropped += 1,
            Ok((_, Instruction::Op(op))) if op == OP_TRUE => break,
            _ => return None,
        }
    }

    if instrs.next().is_some() || pushes == 0 || dropped != pushes {
        return None;
    }

    Some((data, span?))
}
