//! Macros for types whose wire form is just their fields.

/// Implements [`Codec`](crate::Codec) for a tuple newtype by delegating to
/// the wrapped value, so the newtype adds no bytes on the wire.
#[macro_export]
macro_rules! impl_wrapper_codec {
    ($this:ty => $target:ty) => {
        impl $crate::Codec for $this {
            fn decode(dec: &mut impl $crate::Decoder) -> Result<Self, $crate::CodecError> {
                let inner = <$target as $crate::Codec>::decode(dec)?;
                Ok(Self(inner))
            }

            fn encode(&self, enc: &mut impl $crate::Encoder) -> Result<(), $crate::CodecError> {
                <$target as $crate::Codec>::encode(&self.0, enc)
            }
        }
    };
}

/// Declares a struct that is encoded as its fields back to back, in
/// declaration order, with no tags, lengths or padding.
///
/// Fields must be integers or byte arrays, which lets the macro also emit a
/// `WIRE_LEN` constant.  Alongside the struct it generates a `new`
/// constructor taking every field and a by-reference getter per field.
///
/// ```
/// anchor_codec::impl_type_flat_struct! {
///     #[derive(Debug, PartialEq)]
///     pub struct Outpoint {
///         txid: [u8; 32],
///         vout: u32,
///     }
/// }
///
/// assert_eq!(Outpoint::WIRE_LEN, 36);
/// let op = Outpoint::new([0; 32], 1);
/// assert_eq!(anchor_codec::encode_to_vec(&op).unwrap().len(), Outpoint::WIRE_LEN);
/// ```
#[macro_export]
macro_rules! impl_type_flat_struct {
    {
        $( #[ $sattr:meta ] )*
        $v:vis struct $name:ident {
            $(
                $( #[ $fattr:meta ] )*
                $fname:ident : $fty:ty,
            )*
        }
    } => {
        $( #[ $sattr ] )*
        $v struct $name {
            $(
                $( #[ $fattr ] )*
                $fname : $fty,
            )*
        }

        impl $name {
            /// Number of bytes the encoded form takes.
            $v const WIRE_LEN: usize = 0 $( + ::core::mem::size_of::<$fty>() )*;

            /// Constructs a new instance from its fields.
            $v fn new($( $fname : $fty ),*) -> Self {
                Self { $( $fname ),* }
            }

            $(
                #[doc = concat!("Gets the `", stringify!($fname), "` field.")]
                $v fn $fname(&self) -> &$fty {
                    &self.$fname
                }
            )*
        }

        impl $crate::Codec for $name {
            fn decode(dec: &mut impl $crate::Decoder) -> Result<Self, $crate::CodecError> {
                Ok(Self {
                    $( $fname: <$fty as $crate::Codec>::decode(dec)?, )*
                })
            }

            fn encode(&self, enc: &mut impl $crate::Encoder) -> Result<(), $crate::CodecError> {
                $( <$fty as $crate::Codec>::encode(&self.$fname, enc)?; )*
                Ok(())
            }
        }
    }
}
