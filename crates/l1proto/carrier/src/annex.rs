//! Taproot annex carrier, the last witness item of a taproot spend when it
//! starts with `0x50`.

use crate::classify::CarrierMatch;
use crate::config::ParseConfig;
use crate::kind::CarrierKind;

/// First byte of a taproot annex.
pub const ANNEX_TAG: u8 = 0x50;

/// Wraps an encoded payload as an annex item.
pub fn wrap_annex(payload: &[u8]) -> Vec<u8> {
    let mut item = Vec::with_capacity(payload.len() + 1);
    item.push(ANNEX_TAG);
    item.extend_from_slice(payload);
    item
}

/// Matches an annex whose content starts with the magic.
pub fn unwrap_annex(item: &[u8], config: &ParseConfig) -> Option<CarrierMatch> {
    let (&tag, data) = item.split_first()?;
    if tag != ANNEX_TAG || !config.magic_bytes().is_prefix_of(data) {
        return None;
    }

    Some(CarrierMatch::new(CarrierKind::TaprootAnnex, data.to_vec(), 1..item.len()))
}
