//! `OP_RETURN` carrier.
//!
//! ```text
//! 6a <push length> <payload>
//! ```
//!
//! The push length uses the shortest form: direct up to 75 bytes, then
//! `OP_PUSHDATA1`, then `OP_PUSHDATA2`.

use anchor_codec::{MAX_PUSH_LEN, read_push_length};
use bitcoin::{ScriptBuf, opcodes::all::OP_RETURN, script::PushBytesBuf};

use crate::classify::CarrierMatch;
use crate::config::ParseConfig;
use crate::error::{CarrierError, CarrierResult};
use crate::kind::CarrierKind;

/// Wraps an encoded payload in an `OP_RETURN` script.
///
/// # Errors
///
/// [`CarrierError::PayloadTooLarge`] above 65535 bytes, which would need
/// `OP_PUSHDATA4`.
pub fn wrap_op_return(payload: &[u8]) -> CarrierResult<ScriptBuf> {
    if payload.len() > MAX_PUSH_LEN {
        return Err(CarrierError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PUSH_LEN,
        });
    }

    let pushbytes = PushBytesBuf::try_from(payload.to_vec())?;
    let script = ScriptBuf::builder()
        .push_opcode(OP_RETURN)
        .push_slice(pushbytes)
        .into_script();

    Ok(script)
}

/// Matches an `OP_RETURN` script whose first push starts with the magic.
pub fn unwrap_op_return(script: &[u8], config: &ParseConfig) -> Option<CarrierMatch> {
    if script.first() != Some(&OP_RETURN.to_u8()) {
        return None;
    }

    let (len, start) = read_push_length(script, 1).ok()?;
    let end = start.checked_add(usize::try_from(len).ok()?)?;
    let data = script.get(start..end)?;

    if !config.magic_bytes().is_prefix_of(data) {
        return None;
    }

    Some(CarrierMatch::new(CarrierKind::OpReturn, data.to_vec(), start..end))
}

#[cfg(test)]
mod tests {
    use anchor_msg_fmt::encode_payload;
    use bitcoin::opcodes::all::OP_DUP;

    use super::*;

    fn config() -> ParseConfig {
        ParseConfig::default()
    }

    #[test]
    fn test_hi_layout() {
        let payload = encode_payload(1, &[], b"hi").unwrap();
        let script = wrap_op_return(&payload).unwrap();
        assert_eq!(
            script.as_bytes(),
            &[0x6a, 0x08, 0xa1, 0x1c, 0x00, 0x01, 0x01, 0x00, 0x68, 0x69]
        );

        let m = unwrap_op_return(script.as_bytes(), &config()).unwrap();
        assert_eq!(m.kind(), CarrierKind::OpReturn);
        assert_eq!(m.span(), 2..10);
        assert_eq!(m.payload(), &payload[..]);
    }

    #[test]
    fn test_push_length_boundaries() {
        let cases = [(75usize, 1usize), (76, 2), (255, 2), (256, 3), (MAX_PUSH_LEN, 3)];

        for (len, hdr) in cases {
            let mut payload = encode_payload(1, &[], &[]).unwrap();
            payload.resize(len, 0x42);

            let script = wrap_op_return(&payload).unwrap();
            assert_eq!(script.len(), 1 + hdr + len, "payload length {len}");

            let m = unwrap_op_return(script.as_bytes(), &config()).unwrap();
            assert_eq!(m.span().start, 1 + hdr);
            assert_eq!(m.payload(), &payload[..]);
        }

        let script = wrap_op_return(&[0; 76]).unwrap();
        assert_eq!(script.as_bytes()[1], 0x4c);
        let script = wrap_op_return(&[0; 256]).unwrap();
        assert_eq!(&script.as_bytes()[1..4], &[0x4d, 0x00, 0x01]);
    }

    #[test]
    fn test_too_large() {
        let res = wrap_op_return(&vec![0; MAX_PUSH_LEN + 1]);
        assert!(matches!(
            res,
            Err(CarrierError::PayloadTooLarge { len: 65536, max: 65535 })
        ));
    }

    #[test]
    fn test_rejects_non_matching() {
        let payload = encode_payload(1, &[], b"hi").unwrap();

        // Not OP_RETURN.
        let mut bytes = wrap_op_return(&payload).unwrap().into_bytes();
        bytes[0] = OP_DUP.to_u8();
        assert!(unwrap_op_return(&bytes, &config()).is_none());

        // Magic shifted by one byte.
        let mut shifted = vec![0x00];
        shifted.extend_from_slice(&payload);
        let script = wrap_op_return(&shifted).unwrap();
        assert!(unwrap_op_return(script.as_bytes(), &config()).is_none());

        // Push runs past the end.
        let bytes = [0x6a, 0x10, 0xa1, 0x1c, 0x00, 0x01];
        assert!(unwrap_op_return(&bytes, &config()).is_none());

        // Bare OP_RETURN.
        assert!(unwrap_op_return(&[0x6a], &config()).is_none());
    }
}
