//! Cross-lane permute controls

use crate::constants::{IMM_SELECTOR_BITS, LANE_GROUP_BYTES, SHUFFLE_ZERO_BYTE};
use crate::network::{ElementWidth, RegisterWidth};
use crate::selector::ops::UnionPart;
use crate::selector::route::ByteRoute;

/// `vpermq` immediate for the route
///
/// A zmm register applies the immediate to each 256-bit half, so both
/// halves must use the same pattern without exchanging data.
pub fn qword_immediate(route: &ByteRoute, register: RegisterWidth) -> Option<u8> {
    let qwords = route.units(8)?;
    let pattern: &[usize] = match register {
        RegisterWidth::Xmm => return None,
        RegisterWidth::Ymm => &qwords,
        RegisterWidth::Zmm => {
            let (low, high) = qwords.split_at(4);
            let mirrored = low
                .iter()
                .zip(high)
                .all(|(&lo, &hi)| lo < 4 && hi == lo + 4);
            if !mirrored {
                return None;
            }
            low
        }
    };
    Some(pattern.iter().enumerate().fold(0u8, |imm, (slot, &src)| {
        imm | ((src as u8) << (IMM_SELECTOR_BITS as usize * slot))
    }))
}

/// Index vector for a `vperm{b,w,d,q}` over `unit`-wide lanes
pub fn permute_indices(route: &ByteRoute, unit: ElementWidth) -> Option<Vec<u8>> {
    route
        .units(unit.bytes())
        .map(|units| units.into_iter().map(|src| src as u8).collect())
}

/// Masked union parts realizing the route
///
/// Part `r` shuffles a copy of the input whose lane group `d` holds source
/// group `(d + r) % G`. Each destination byte is produced by exactly one
/// part and zeroed by the others, so OR-ing all parts yields the result.
/// Rotations that no byte needs are omitted.
pub fn masked_union(route: &ByteRoute) -> Vec<UnionPart> {
    let groups = route.lane_groups();
    (0..groups)
        .filter_map(|rotation| {
            let mut used = false;
            let control: Vec<u8> = route
                .sources()
                .iter()
                .enumerate()
                .map(|(dst, &src)| {
                    let wanted = (dst / LANE_GROUP_BYTES + rotation) % groups;
                    if src / LANE_GROUP_BYTES == wanted {
                        used = true;
                        (src % LANE_GROUP_BYTES) as u8
                    } else {
                        SHUFFLE_ZERO_BYTE
                    }
                })
                .collect();
            used.then_some(UnionPart { rotation, control })
        })
        .collect()
}
