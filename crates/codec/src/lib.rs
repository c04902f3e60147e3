//! Byte-level primitives shared by the ANCHOR payload codec and the
//! transaction walker.
//!
//! Everything here is Bitcoin flavoured: fixed-width integers are
//! little-endian, lengths are compact-size, and script pushes use the
//! direct / `OP_PUSHDATA1` / `OP_PUSHDATA2` / `OP_PUSHDATA4` forms.

mod errors;
pub use errors::{CodecError, CodecResult};

mod types;
pub use types::{Codec, Decoder, Encoder};

mod cursor;
pub use cursor::ByteCursor;

mod compact_size;
pub use compact_size::{
    CompactSize, CompactSizeWidth, compact_size_len, read_compact_size, write_compact_size,
};

mod push;
pub use push::{
    MAX_PUSH_LEN, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4, PushEncoding, PushMode,
    encode_push_length, read_push_length, read_push_length_with,
};

mod macros;

mod util;
pub use util::{decode_buf_exact, encode_to_vec};
