//! Lane-local shuffle controls
//!
//! All three builders give up as soon as one byte would have to leave its
//! 16-byte lane group. The immediate forms also need every lane group to
//! use the same pattern, since one immediate drives all of them.

use crate::constants::{IMM_SELECTOR_BITS, LANE_GROUP_BYTES};
use crate::selector::route::ByteRoute;

/// Units of `unit_bytes` per lane group
fn per_group(unit_bytes: usize) -> usize {
    LANE_GROUP_BYTES / unit_bytes
}

/// In-group source slot of every unit, if all groups share one pattern
fn shared_pattern(route: &ByteRoute, unit_bytes: usize) -> Option<Vec<usize>> {
    let units = route.units(unit_bytes)?;
    let width = per_group(unit_bytes);
    let mut pattern: Option<Vec<usize>> = None;

    for (group, chunk) in units.chunks(width).enumerate() {
        if chunk.iter().any(|&src| src / width != group) {
            return None;
        }
        let local: Vec<usize> = chunk.iter().map(|&src| src % width).collect();
        match &pattern {
            Some(first) if *first != local => return None,
            Some(_) => {}
            None => pattern = Some(local),
        }
    }
    pattern
}

/// Packs four 2-bit selectors into an immediate
fn pack_selectors(selectors: &[usize]) -> u8 {
    selectors
        .iter()
        .enumerate()
        .fold(0u8, |imm, (slot, &sel)| imm | ((sel as u8) << (IMM_SELECTOR_BITS as usize * slot)))
}

/// `pshufd` immediate for the route
pub fn dword_immediate(route: &ByteRoute) -> Option<u8> {
    shared_pattern(route, 4).map(|pattern| pack_selectors(&pattern))
}

/// `pshuflw` and `pshufhw` immediates for the route
///
/// Both instructions leave the other 64-bit half untouched, so each word
/// has to stay inside its own half.
pub fn word_immediates(route: &ByteRoute) -> Option<(u8, u8)> {
    let pattern = shared_pattern(route, 2)?;
    let (low, high) = pattern.split_at(4);
    if low.iter().any(|&sel| sel >= 4) || high.iter().any(|&sel| sel < 4) {
        return None;
    }
    let high: Vec<usize> = high.iter().map(|&sel| sel - 4).collect();
    Some((pack_selectors(low), pack_selectors(&high)))
}

/// `pshufb` control for the route
///
/// Unlike the immediates, each lane group may use its own pattern.
pub fn byte_table(route: &ByteRoute) -> Option<Vec<u8>> {
    if !route.is_lane_local() {
        return None;
    }
    Some(
        route
            .sources()
            .iter()
            .map(|&src| (src % LANE_GROUP_BYTES) as u8)
            .collect(),
    )
}
