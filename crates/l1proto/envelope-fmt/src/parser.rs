use std::ops::Range;

use anchor_codec::read_push_length;
use bitcoin::{
    Script,
    opcodes::all::{OP_ENDIF, OP_IF, OP_PUSHNUM_1},
    script::{Instruction, InstructionIndices},
};

use crate::errors::EnvelopeParseError;

/// Tagged envelope extracted from a script.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaggedEnvelope {
    content_type: Vec<u8>,
    body: Vec<u8>,
    body_span: Range<usize>,
    body_pushes: usize,
}

impl TaggedEnvelope {
    /// Gets the content type field.
    pub fn content_type(&self) -> &[u8] {
        &self.content_type
    }

    /// Gets the reassembled body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the envelope, returning the body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Byte range within the script from the first body data byte to the end
    /// of the last one.  Push opcodes between chunks fall inside it.
    pub fn body_span(&self) -> Range<usize> {
        self.body_span.clone()
    }

    /// Number of pushes the body was split across.
    pub fn body_pushes(&self) -> usize {
        self.body_pushes
    }
}

/// Parse the first envelope tagged with `protocol_id` from a script.
///
/// Envelopes with a different protocol id are skipped.  Anything may come
/// before the envelope, which allows for a key and `OP_CHECKSIG` in front.
///
/// # Errors
///
/// Returns [`EnvelopeParseError`] if the script has no envelope for the
/// protocol or the matching envelope is malformed.
pub fn parse_tagged_envelope(
    script: &Script,
    protocol_id: &[u8],
) -> Result<TaggedEnvelope, EnvelopeParseError> {
    let mut instructions = script.instruction_indices();

    loop {
        enter_envelope(&mut instructions)?;
        match next_instruction(&mut instructions)? {
            Some((_, Instruction::PushBytes(id))) if id.as_bytes() == protocol_id => break,
            _ => continue,
        }
    }

    let content_type = read_content_type(&mut instructions)?;

    match next_instruction(&mut instructions)? {
        Some((_, Instruction::PushBytes(tag))) if tag.is_empty() => {}
        _ => return Err(EnvelopeParseError::MissingBodyTag),
    }

    let (body, body_span, body_pushes) = extract_until_op_endif(script, &mut instructions)?;

    Ok(TaggedEnvelope {
        content_type,
        body,
        body_span,
        body_pushes,
    })
}

fn next_instruction<'a>(
    instructions: &mut InstructionIndices<'a>,
) -> Result<Option<(usize, Instruction<'a>)>, EnvelopeParseError> {
    instructions
        .next()
        .transpose()
        .map_err(|_| EnvelopeParseError::MalformedScript)
}

/// Skip ahead past the next consecutive `OP_FALSE` and `OP_IF`.
fn enter_envelope(instructions: &mut InstructionIndices<'_>) -> Result<(), EnvelopeParseError> {
    let mut prev_false = false;
    loop {
        match next_instruction(instructions)? {
            None => return Err(EnvelopeParseError::NoEnvelopesFound),
            Some((_, Instruction::Op(OP_IF))) if prev_false => return Ok(()),
            // OP_FALSE is basically empty PushBytes
            Some((_, Instruction::PushBytes(b))) => prev_false = b.is_empty(),
            Some(_) => prev_false = false,
        }
    }
}

/// The content type tag may be written as `OP_1` or as a one byte push of 1.
fn read_content_type(
    instructions: &mut InstructionIndices<'_>,
) -> Result<Vec<u8>, EnvelopeParseError> {
    match next_instruction(instructions)? {
        Some((_, Instruction::Op(OP_PUSHNUM_1))) => {}
        Some((_, Instruction::PushBytes(b))) if b.as_bytes() == [1] => {}
        _ => return Err(EnvelopeParseError::MissingContentType),
    }

    match next_instruction(instructions)? {
        Some((_, Instruction::PushBytes(ct))) => Ok(ct.as_bytes().to_vec()),
        _ => Err(EnvelopeParseError::MissingContentType),
    }
}

/// Concatenate pushes up to `OP_ENDIF`, tracking where their data sits.
fn extract_until_op_endif(
    script: &Script,
    instructions: &mut InstructionIndices<'_>,
) -> Result<(Vec<u8>, Range<usize>, usize), EnvelopeParseError> {
    let mut data = vec![];
    let mut span: Option<Range<usize>> = None;
    let mut pushes = 0;

    loop {
        match next_instruction(instructions)? {
            Some((idx, Instruction::Op(OP_ENDIF))) => {
                let span = span.unwrap_or(idx..idx);
                return Ok((data, span, pushes));
            }
            Some((idx, Instruction::PushBytes(b))) => {
                let (_, start) = read_push_length(script.as_bytes(), idx)
                    .map_err(|_| EnvelopeParseError::MalformedScript)?;
                let end = start + b.len();
                span = Some(match span {
                    Some(s) => s.start..end,
                    None => start..end,
                });
                data.extend_from_slice(b.as_bytes());
                pushes += 1;
            }
            _ => return Err(EnvelopeParseError::InvalidPayload),
        }
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{ScriptBuf, opcodes::all::OP_CHECKSIG, script::PushBytesBuf};

    use super::*;
    use crate::builder::{build_tagged_envelope, push_tagged_envelope};

    #[test]
    fn test_parse_envelope_data() {
        let small = vec![0, 1, 2, 3];
        let script = build_tagged_envelope(b"anchor", b"text/plain", &small).unwrap();
        let env = parse_tagged_envelope(&script, b"anchor").unwrap();

        assert_eq!(env.body(), &small[..]);
        assert_eq!(env.content_type(), b"text/plain");
        assert_eq!(env.body_pushes(), 1);
        assert_eq!(&script.as_bytes()[env.body_span()], &small[..]);

        // Try with larger size
        let large = vec![1; 2000];
        let script = build_tagged_envelope(b"anchor", b"", &large).unwrap();

        let env = parse_tagged_envelope(&script, b"anchor").unwrap();
        assert_eq!(env.body(), &large[..]);
        assert!(env.content_type().is_empty());
        assert_eq!(env.body_pushes(), 4);

        // 3 push headers of 3 bytes each sit between the 4 chunks.
        assert_eq!(env.body_span().len(), 2000 + 3 * 3);
    }

    #[test]
    fn test_skips_foreign_envelopes() {
        let builder = ScriptBuf::builder()
            .push_slice(PushBytesBuf::try_from(vec![0x02; 32]).unwrap())
            .push_opcode(OP_CHECKSIG);
        let builder = push_tagged_envelope(builder, b"ord", b"image/png", b"png").unwrap();
        let builder = push_tagged_envelope(builder, b"anchor", b"text/plain", b"mine").unwrap();
        let script = builder.into_script();

        let env = parse_tagged_envelope(&script, b"anchor").unwrap();
        assert_eq!(env.body(), b"mine");

        assert_eq!(
            parse_tagged_envelope(&script, b"other"),
            Err(EnvelopeParseError::NoEnvelopesFound)
        );
    }

    #[test]
    fn test_missing_endif() {
        let mut bytes = build_tagged_envelope(b"anchor", b"t", b"abc").unwrap().into_bytes();
        // drop OP_ENDIF OP_TRUE
        bytes.truncate(bytes.len() - 2);
        let script = ScriptBuf::from_bytes(bytes);

        assert_eq!(
            parse_tagged_envelope(&script, b"anchor"),
            Err(EnvelopeParseError::InvalidPayload)
        );
    }

    #[test]
    fn test_missing_content_type() {
        let script = ScriptBuf::from_bytes(vec![0x00, 0x63, 0x01, 0xaa, 0x68]);
        assert_eq!(
            parse_tagged_envelope(&script, &[0xaa]),
            Err(EnvelopeParseError::MissingContentType)
        );
    }

    #[test]
    fn test_not_a_script() {
        // Claims a 75 byte push with 2 bytes of data.
        let script = ScriptBuf::from_bytes(vec![0x4b, 0x01, 0x02]);
        assert_eq!(
            parse_tagged_envelope(&script, b"anchor"),
            Err(EnvelopeParseError::MalformedScript)
        );
    }
}
