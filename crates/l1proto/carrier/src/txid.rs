use anchor_msg_fmt::AnchorRef;
use bitcoin::{Txid, hashes::Hash};

fn display_bytes(txid: &Txid) -> [u8; 32] {
    let mut bytes = txid.to_byte_array();
    bytes.reverse();
    bytes
}

/// Builds an anchor pointing at output `vout` of `txid`.
pub fn anchor_ref_for(txid: &Txid, vout: u8) -> AnchorRef {
    AnchorRef::from_display_txid(&display_bytes(txid), vout)
}

/// Checks if an anchor's prefix matches `txid`.  The vout isn't compared.
pub fn anchor_references(anchor: &AnchorRef, txid: &Txid) -> bool {
    anchor.matches_display_txid(&display_bytes(txid))
}
