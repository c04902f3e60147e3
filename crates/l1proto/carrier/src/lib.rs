//! Carriers that embed ANCHOR payloads in Bitcoin transactions.
//!
//! There are five of them.  Two live in an output's `scriptPubKey`:
//!
//! - `OP_RETURN <payload>`
//! - stamps, a bare multisig whose "pubkeys" are 33 byte payload chunks
//!
//! and three in an input's witness stack:
//!
//! - an inscription envelope in a tapscript
//! - the taproot annex, `0x50 <payload>`
//! - plain witness data, pushed and then dropped by the tapscript
//!
//! Each has a `wrap_*` encoder and an `unwrap_*` matcher.  [`classify`] and
//! [`extract`] try them in a fixed order and report the first structural
//! match.

mod annex;
mod classify;
mod config;
mod error;
mod inscription;
mod kind;
mod op_return;
mod stamps;
mod txid;
mod witness_data;

pub use annex::{ANNEX_TAG, unwrap_annex, wrap_annex};
pub use classify::{CarrierMatch, ScriptOrWitnessItem, classify, extract};
pub use config::{ANCHOR_PROTOCOL_ID, ParseConfig};
pub use error::{CarrierError, CarrierResult};
pub use inscription::{WitnessEnvelope, unwrap_inscription, wrap_inscription};
pub use kind::{CarrierKind, CarrierLocation};
pub use op_return::{unwrap_op_return, wrap_op_return};
pub use stamps::{STAMP_CHUNK_LEN, unwrap_stamps, wrap_stamps};
pub use txid::{anchor_ref_for, anchor_references};
pub use witness_data::{unwrap_witness_data, wrap_witness_data};
