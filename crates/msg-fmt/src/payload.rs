//! Payload encoding and decoding.

use anchor_codec::{ByteCursor, Codec, Decoder, Encoder};

use crate::anchor::{ANCHOR_REF_LEN, AnchorRef};
use crate::error::{PayloadError, PayloadResult};
use crate::magic::{ANCHOR_MAGIC, MAGIC_BYTES_LEN, MagicBytes};

/// The maximum number of anchors, since the count is a single byte.
pub const MAX_ANCHORS: usize = u8::MAX as usize;

/// Length of a payload with no anchors and an empty body.
pub const MIN_PAYLOAD_LEN: usize = MAGIC_BYTES_LEN + 2;

/// Returns the length of the fixed part of a payload carrying `anchor_count`
/// anchors, which is where the body begins.
pub const fn header_len(anchor_count: usize) -> usize {
    MIN_PAYLOAD_LEN + ANCHOR_REF_LEN * anchor_count
}

/// A decoded ANCHOR payload.
pub trait Payload {
    /// Gets the magic the payload was framed with.
    fn magic(&self) -> MagicBytes;

    /// Gets the kind byte.
    fn kind(&self) -> u8;

    /// Gets the number of anchors.
    fn anchor_count(&self) -> usize;

    /// Gets the anchor at `idx`, in encoding order.
    fn anchor(&self, idx: usize) -> Option<AnchorRef>;

    /// Gets a slice of the body.
    fn body(&self) -> &[u8];

    /// Gets the canonical parent reference, which is always the first anchor.
    fn canonical_parent(&self) -> Option<AnchorRef> {
        self.anchor(0)
    }

    /// Returns the encoded length in bytes.
    fn encoded_len(&self) -> usize {
        header_len(self.anchor_count()) + self.body().len()
    }

    /// Encodes the payload into a vec.
    fn to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(self.magic().as_bytes());
        buf.push(self.kind());
        buf.push(self.anchor_count() as u8);
        for a in (0..self.anchor_count()).filter_map(|i| self.anchor(i)) {
            let _ = a.encode(&mut buf);
        }
        buf.extend_from_slice(self.body());
        buf
    }
}

/// Payload borrowed from a buffer.  The anchors are kept encoded and decoded
/// on access.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PayloadRef<'b> {
    magic: MagicBytes,
    kind: u8,
    anchors: &'b [u8],
    body: &'b [u8],
}

impl<'b> PayloadRef<'b> {
    /// Parses a payload framed with `magic`.
    pub fn parse_with_magic(magic: MagicBytes, buf: &'b [u8]) -> PayloadResult<Self> {
        if buf.len() < MAGIC_BYTES_LEN {
            return Err(PayloadError::TruncatedInput {
                needed: MIN_PAYLOAD_LEN,
                available: buf.len(),
            });
        }

        let mut cur = ByteCursor::new(buf);
        let found = MagicBytes::decode(&mut cur).map_err(|_| truncated(MIN_PAYLOAD_LEN, buf))?;
        if found != magic {
            return Err(PayloadError::BadMagic(found));
        }

        let [kind, count] = cur
            .read_arr::<2>()
            .map_err(|_| truncated(MIN_PAYLOAD_LEN, buf))?;

        let anchors_len = ANCHOR_REF_LEN * count as usize;
        let anchors = cur
            .read_slice(anchors_len)
            .map_err(|_| truncated(header_len(count as usize), buf))?;

        Ok(Self {
            magic,
            kind,
            anchors,
            body: cur.rest(),
        })
    }

    /// Iterates over the anchors in encoding order.
    pub fn anchors(&self) -> impl Iterator<Item = AnchorRef> + '_ {
        self.anchors
            .chunks_exact(ANCHOR_REF_LEN)
            .filter_map(|c| AnchorRef::decode(&mut ByteCursor::new(c)).ok())
    }

    /// Converts to an [`AnchorPayload`].
    pub fn to_owned(&self) -> AnchorPayload {
        AnchorPayload {
            magic: self.magic,
            kind: self.kind,
            anchors: self.anchors().collect(),
            body: self.body.to_vec(),
        }
    }
}

impl<'b> TryFrom<&'b [u8]> for PayloadRef<'b> {
    type Error = PayloadError;

    fn try_from(value: &'b [u8]) -> Result<Self, Self::Error> {
        Self::parse_with_magic(ANCHOR_MAGIC, value)
    }
}

impl Payload for PayloadRef<'_> {
    fn magic(&self) -> MagicBytes {
        self.magic
    }

    fn kind(&self) -> u8 {
        self.kind
    }

    fn anchor_count(&self) -> usize {
        self.anchors.len() / ANCHOR_REF_LEN
    }

    fn anchor(&self, idx: usize) -> Option<AnchorRef> {
        let start = idx.checked_mul(ANCHOR_REF_LEN)?;
        let raw = self.anchors.get(start..start + ANCHOR_REF_LEN)?;
        AnchorRef::decode(&mut ByteCursor::new(raw)).ok()
    }

    fn body(&self) -> &[u8] {
        self.body
    }
}

/// Decoded ANCHOR payload.  Owns its contents.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorPayload {
    magic: MagicBytes,
    kind: u8,
    anchors: Vec<AnchorRef>,
    #[cfg_attr(feature = "serde", serde(with = "hex"))]
    body: Vec<u8>,
}

impl AnchorPayload {
    /// Constructs a new v1 payload, checking the anchor count fits.
    pub fn new(kind: u8, anchors: Vec<AnchorRef>, body: Vec<u8>) -> PayloadResult<Self> {
        Self::with_magic(ANCHOR_MAGIC, kind, anchors, body)
    }

    /// Constructs a new payload framed with a custom magic.
    pub fn with_magic(
        magic: MagicBytes,
        kind: u8,
        anchors: Vec<AnchorRef>,
        body: Vec<u8>,
    ) -> PayloadResult<Self> {
        check_anchor_count(anchors.len())?;
        Ok(Self {
            magic,
            kind,
            anchors,
            body,
        })
    }

    /// Gets all anchors in encoding order.
    pub fn anchors(&self) -> &[AnchorRef] {
        &self.anchors
    }

    /// Gets the anchors after the canonical parent.
    pub fn supplementary(&self) -> &[AnchorRef] {
        self.anchors.get(1..).unwrap_or_default()
    }

    /// Splits into the kind, anchors and body.
    pub fn into_parts(self) -> (u8, Vec<AnchorRef>, Vec<u8>) {
        (self.kind, self.anchors, self.body)
    }
}

impl Payload for AnchorPayload {
    fn magic(&self) -> MagicBytes {
        self.magic
    }

    fn kind(&self) -> u8 {
        self.kind
    }

    fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    fn anchor(&self, idx: usize) -> Option<AnchorRef> {
        self.anchors.get(idx).copied()
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

impl<'b> TryFrom<&'b [u8]> for AnchorPayload {
    type Error = PayloadError;

    fn try_from(value: &'b [u8]) -> Result<Self, Self::Error> {
        PayloadRef::try_from(value).map(|p| p.to_owned())
    }
}

fn truncated(needed: usize, buf: &[u8]) -> PayloadError {
    PayloadError::TruncatedInput {
        needed,
        available: buf.len(),
    }
}

fn check_anchor_count(n: usize) -> PayloadResult<()> {
    if n > MAX_ANCHORS {
        return Err(PayloadError::TooManyAnchors(n));
    }
    Ok(())
}

/// Encodes a v1 payload.
///
/// Fails with [`PayloadError::TooManyAnchors`] if there are more than
/// [`MAX_ANCHORS`] anchors, producing no output.
pub fn encode_payload(kind: u8, anchors: &[AnchorRef], body: &[u8]) -> PayloadResult<Vec<u8>> {
    encode_payload_with_magic(ANCHOR_MAGIC, kind, anchors, body)
}

/// Encodes a payload framed with a custom magic.
pub fn encode_payload_with_magic(
    magic: MagicBytes,
    kind: u8,
    anchors: &[AnchorRef],
    body: &[u8],
) -> PayloadResult<Vec<u8>> {
    check_anchor_count(anchors.len())?;

    let mut buf = Vec::with_capacity(header_len(anchors.len()) + body.len());
    // Writes into a vec are infallible.
    let _ = magic.encode(&mut buf);
    let _ = buf.write_buf(&[kind, anchors.len() as u8]);
    for a in anchors {
        let _ = a.encode(&mut buf);
    }
    buf.extend_from_slice(body);

    Ok(buf)
}

/// Decodes a v1 payload.
///
/// Only the framing is checked, the kind and body are carried as is.
pub fn decode_payload(buf: &[u8]) -> PayloadResult<AnchorPayload> {
    AnchorPayload::try_from(buf)
}

/// Decodes a payload framed with a custom magic.
pub fn decode_payload_with_magic(magic: MagicBytes, buf: &[u8]) -> PayloadResult<AnchorPayload> {
    PayloadRef::parse_with_magic(magic, buf).map(|p| p.to_owned())
}

/// Drops zero bytes from the end of `buf`, removing at most `max_pad` and
/// never cutting into the header declared by the anchor count.
///
/// Carriers that pad to a fixed chunk size use this to find the logical end
/// of a payload.  A body that really ends in zero bytes loses them.
pub fn trim_zero_padding(buf: &[u8], max_pad: usize) -> &[u8] {
    let Some(&count) = buf.get(MIN_PAYLOAD_LEN - 1) else {
        return buf;
    };

    let floor = header_len(count as usize).max(buf.len().saturating_sub(max_pad));
    let mut end = buf.len();
    while end > floor && buf[end - 1] == 0 {
        end -= 1;
    }

    &buf[..end]
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn anchor(n: u8) -> AnchorRef {
        AnchorRef::new([n; 8], n)
    }

    #[test]
    fn test_encode_text_hi() {
        let buf = encode_payload(1, &[], b"hi").unwrap();
        assert_eq!(buf, [0xa1, 0x1c, 0x00, 0x01, 0x01, 0x00, 0x68, 0x69]);

        let p = decode_payload(&buf).unwrap();
        assert_eq!(p.kind(), 1);
        assert!(p.anchors().is_empty());
        assert_eq!(p.body(), b"hi");
        assert_eq!(p.to_vec(), buf);
    }

    #[test]
    fn test_anchor_order_preserved() {
        let anchors = vec![anchor(3), anchor(1), anchor(2)];
        let buf = encode_payload(7, &anchors, b"body").unwrap();
        assert_eq!(buf.len(), header_len(3) + 4);

        let p = decode_payload(&buf).unwrap();
        assert_eq!(p.anchors(), &anchors[..]);
        assert_eq!(p.canonical_parent(), Some(anchor(3)));
        assert_eq!(p.supplementary(), &[anchor(1), anchor(2)]);

        let r = PayloadRef::try_from(&buf[..]).unwrap();
        assert_eq!(r.anchor_count(), 3);
        assert_eq!(r.anchor(2), Some(anchor(2)));
        assert_eq!(r.anchor(3), None);
        assert_eq!(r.anchors().collect::<Vec<_>>(), anchors);
    }

    #[test]
    fn test_too_many_anchors() {
        let anchors = vec![anchor(0); MAX_ANCHORS + 1];
        assert_eq!(
            encode_payload(1, &anchors, &[]),
            Err(PayloadError::TooManyAnchors(256))
        );
        assert!(AnchorPayload::new(1, anchors, Vec::new()).is_err());

        let anchors = vec![anchor(0); MAX_ANCHORS];
        let buf = encode_payload(1, &anchors, &[]).unwrap();
        assert_eq!(buf[5], 255);
        assert_eq!(decode_payload(&buf).unwrap().anchors().len(), MAX_ANCHORS);
    }

    #[test]
    fn test_bad_magic() {
        let mut buf = encode_payload(1, &[], b"hi").unwrap();
        buf[3] = 0x02;
        assert_eq!(
            decode_payload(&buf),
            Err(PayloadError::BadMagic(MagicBytes::new([0xa1, 0x1c, 0x00, 0x02])))
        );
    }

    #[test]
    fn test_truncated() {
        let cases: [(&[u8], usize); 3] = [
            (&[0xa1, 0x1c], MIN_PAYLOAD_LEN),
            (&[0xa1, 0x1c, 0x00, 0x01, 0x01], MIN_PAYLOAD_LEN),
            // declares 2 anchors but only carries one
            (&[0xa1, 0x1c, 0x00, 0x01, 0x01, 0x02, 1, 1, 1, 1, 1, 1, 1, 1, 1], header_len(2)),
        ];

        for (buf, needed) in cases {
            assert_eq!(
                decode_payload(buf),
                Err(PayloadError::TruncatedInput {
                    needed,
                    available: buf.len()
                })
            );
        }
    }

    #[test]
    fn test_custom_magic() {
        let magic = MagicBytes::new(*b"TEST");
        let buf = encode_payload_with_magic(magic, 2, &[anchor(5)], b"x").unwrap();
        assert!(matches!(decode_payload(&buf), Err(PayloadError::BadMagic(_))));

        let p = decode_payload_with_magic(magic, &buf).unwrap();
        assert_eq!(p.magic(), magic);
        assert_eq!(p.to_vec(), buf);
    }

    #[test]
    fn test_trim_zero_padding() {
        let buf = encode_payload(1, &[], b"hi").unwrap();
        let mut padded = buf.clone();
        padded.extend_from_slice(&[0; 25]);
        assert_eq!(trim_zero_padding(&padded, 32), &buf[..]);

        // Limited by max_pad.
        assert_eq!(trim_zero_padding(&padded, 5).len(), padded.len() - 5);

        // Never eats into the anchors, even if they're zero.
        let zeros = encode_payload(0, &[AnchorRef::new([0; 8], 0)], &[]).unwrap();
        let mut padded = zeros.clone();
        padded.extend_from_slice(&[0; 10]);
        assert_eq!(trim_zero_padding(&padded, 32), &zeros[..]);

        // Too short to have a count, left alone.
        assert_eq!(trim_zero_padding(&[0, 0, 0], 32), &[0, 0, 0]);
    }

    fn arb_anchors() -> impl Strategy<Value = Vec<AnchorRef>> {
        proptest::collection::vec(
            (any::<[u8; 8]>(), any::<u8>()).prop_map(|(p, v)| AnchorRef::new(p, v)),
            0..=MAX_ANCHORS,
        )
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            kind in any::<u8>(),
            anchors in arb_anchors(),
            body in proptest::collection::vec(any::<u8>(), 0..600),
        ) {
            let buf = encode_payload(kind, &anchors, &body).unwrap();
            prop_assert_eq!(buf.len(), header_len(anchors.len()) + body.len());

            let decoded = decode_payload(&buf).unwrap();
            prop_assert_eq!(decoded, AnchorPayload::new(kind, anchors, body).unwrap());
        }

        #[test]
        fn prop_decode_never_panics(buf in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = decode_payload(&buf);
            let _ = trim_zero_padding(&buf, 32);
        }
    }
}
