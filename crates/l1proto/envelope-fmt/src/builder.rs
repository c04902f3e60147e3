use bitcoin::{
    ScriptBuf,
    blockdata::script,
    constants::MAX_SCRIPT_ELEMENT_SIZE,
    opcodes::{
        OP_0, OP_FALSE, OP_TRUE,
        all::{OP_ENDIF, OP_IF, OP_PUSHNUM_1},
    },
    script::PushBytesBuf,
};

use crate::errors::EnvelopeBuildError;

/// Builds a Bitcoin script containing a tagged envelope.
///
/// Creates a script with the structure:
/// `OP_FALSE OP_IF <protocol_id> OP_1 <content_type> OP_0 <body_chunks> OP_ENDIF OP_TRUE`.
/// The body is automatically split into chunks of up to
/// [`MAX_SCRIPT_ELEMENT_SIZE`] bytes to comply with Bitcoin's consensus rules.
///
/// # Errors
///
/// Returns [`EnvelopeBuildError::FieldTooLong`] if the protocol id or content
/// type doesn't fit in one stack element.
pub fn build_tagged_envelope(
    protocol_id: &[u8],
    content_type: &[u8],
    body: &[u8],
) -> Result<ScriptBuf, EnvelopeBuildError> {
    let builder = script::Builder::new();
    let builder = push_tagged_envelope(builder, protocol_id, content_type, body)?;
    Ok(builder.push_opcode(OP_TRUE).into_script())
}

/// Extends a builder with one envelope, without the trailing `OP_TRUE`.
pub fn push_tagged_envelope(
    mut builder: script::Builder,
    protocol_id: &[u8],
    content_type: &[u8],
    body: &[u8],
) -> Result<script::Builder, EnvelopeBuildError> {
    let protocol_id = to_field(protocol_id)?;
    let content_type = to_field(content_type)?;

    builder = builder
        .push_opcode(OP_FALSE)
        .push_opcode(OP_IF)
        .push_slice(protocol_id)
        .push_opcode(OP_PUSHNUM_1)
        .push_slice(content_type)
        .push_opcode(OP_0);

    builder = push_chunks(builder, body)?;

    Ok(builder.push_opcode(OP_ENDIF))
}

/// Pushes `data` as consecutive pushes of at most [`MAX_SCRIPT_ELEMENT_SIZE`]
/// bytes each.
pub fn push_chunks(
    mut builder: script::Builder,
    data: &[u8],
) -> Result<script::Builder, EnvelopeBuildError> {
    for chunk in data.chunks(MAX_SCRIPT_ELEMENT_SIZE) {
        let push_bytes = PushBytesBuf::try_from(chunk.to_vec()).map_err(|_| {
            EnvelopeBuildError::PayloadChunkConversion {
                chunk_size: chunk.len(),
            }
        })?;
        builder = builder.push_slice(push_bytes);
    }

    Ok(builder)
}

fn to_field(field: &[u8]) -> Result<PushBytesBuf, EnvelopeBuildError> {
    if field.len() > MAX_SCRIPT_ELEMENT_SIZE {
        return Err(EnvelopeBuildError::FieldTooLong(field.len()));
    }

    PushBytesBuf::try_from(field.to_vec()).map_err(|_| EnvelopeBuildError::FieldTooLong(field.len()))
}
