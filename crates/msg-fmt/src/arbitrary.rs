use arbitrary::{Arbitrary, Unstructured};

use crate::{ANCHOR_MAGIC, AnchorPayload, AnchorRef, MAX_ANCHORS, MagicBytes};

impl<'a> Arbitrary<'a> for MagicBytes {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(MagicBytes::new(u.arbitrary()?))
    }
}

impl<'a> Arbitrary<'a> for AnchorPayload {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        // Always v1 framed, so fuzzed payloads go down the real decode path.
        let kind = u8::arbitrary(u)?;
        let n = u.int_in_range(0..=MAX_ANCHORS)?;
        let anchors = (0..n)
            .map(|_| AnchorRef::arbitrary(u))
            .collect::<arbitrary::Result<Vec<_>>>()?;
        let body = Vec::<u8>::arbitrary(u)?;

        AnchorPayload::with_magic(ANCHOR_MAGIC, kind, anchors, body)
            .map_err(|_| arbitrary::Error::IncorrectFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Payload, decode_payload};

    #[test]
    fn test_arbitrary_payloads_decode() {
        let raw: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let mut u = Unstructured::new(&raw);

        for _ in 0..8 {
            let p = AnchorPayload::arbitrary(&mut u).unwrap();
            assert_eq!(decode_payload(&p.to_vec()).unwrap(), p);
        }
    }
}
