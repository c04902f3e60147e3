use crate::CodecError;

/// A value with a fixed, untagged wire layout.
///
/// Everything on the wire here is either a little-endian integer, a byte
/// array, or a flat sequence of those (see [`impl_type_flat_struct`]).
/// Variable length data like scripts and payload bodies is handled by the
/// callers, which know where it ends.
///
/// [`impl_type_flat_struct`]: crate::impl_type_flat_struct
pub trait Codec: Sized {
    /// Reads a value.
    fn decode(dec: &mut impl Decoder) -> Result<Self, CodecError>;

    /// Writes the value.
    fn encode(&self, enc: &mut impl Encoder) -> Result<(), CodecError>;
}

/// Source of bytes for [`Codec::decode`].
pub trait Decoder {
    /// Fills `into` completely or fails without a partial read being
    /// observable to the caller.
    fn read_buf(&mut self, into: &mut [u8]) -> Result<(), CodecError>;

    /// Reads exactly `N` bytes.
    fn read_arr<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut arr = [0; N];
        self.read_buf(&mut arr)?;
        Ok(arr)
    }
}

/// Sink for [`Codec::encode`].
pub trait Encoder {
    /// Appends raw bytes.
    fn write_buf(&mut self, buf: &[u8]) -> Result<(), CodecError>;

    /// Appends one byte.
    fn write_u8(&mut self, b: u8) -> Result<(), CodecError> {
        self.write_buf(&[b])
    }
}

impl Encoder for Vec<u8> {
    fn write_buf(&mut self, buf: &[u8]) -> Result<(), CodecError> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

impl<const N: usize> Codec for [u8; N] {
    fn decode(dec: &mut impl Decoder) -> Result<Self, CodecError> {
        dec.read_arr()
    }

    fn encode(&self, enc: &mut impl Encoder) -> Result<(), CodecError> {
        enc.write_buf(self)
    }
}

/// Integers are little-endian, as in transaction serialization.
macro_rules! impl_le_int_codec {
    ($($ity:ty),* $(,)?) => {
        $(
            impl Codec for $ity {
                fn decode(dec: &mut impl Decoder) -> Result<Self, CodecError> {
                    dec.read_arr().map(<$ity>::from_le_bytes)
                }

                fn encode(&self, enc: &mut impl Encoder) -> Result<(), CodecError> {
                    enc.write_buf(&self.to_le_bytes())
                }
            }
        )*
    };
}

impl_le_int_codec!(u8, u16, u32, u64);
