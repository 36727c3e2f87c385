//! Byte-level data movement of a permute step

use crate::constants::LANE_GROUP_BYTES;
use crate::network::{ElementWidth, Permutation};

/// Source byte of every destination byte in a register
///
/// Every shuffle and permute control is derived from this map, so controls
/// built for different unit widths agree on where each byte comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRoute {
    sources: Vec<usize>,
}

impl ByteRoute {
    /// Routes a register whose `unit`-wide lanes read from their partners
    pub fn from_permutation(perm: &Permutation, unit: ElementWidth) -> Self {
        let k = unit.bytes();
        let sources = perm
            .partners()
            .into_iter()
            .flat_map(|partner| (0..k).map(move |offset| partner * k + offset))
            .collect();
        ByteRoute { sources }
    }

    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    pub fn bytes(&self) -> usize {
        self.sources.len()
    }

    pub fn lane_groups(&self) -> usize {
        self.bytes().div_ceil(LANE_GROUP_BYTES)
    }

    /// True when no byte leaves its 16-byte lane group
    pub fn is_lane_local(&self) -> bool {
        self.sources
            .iter()
            .enumerate()
            .all(|(dst, &src)| dst / LANE_GROUP_BYTES == src / LANE_GROUP_BYTES)
    }

    /// Source unit of every `unit_bytes`-wide destination unit
    ///
    /// Returns `None` unless every unit is read whole from an aligned
    /// source unit.
    pub fn units(&self, unit_bytes: usize) -> Option<Vec<usize>> {
        if unit_bytes == 0 || self.bytes() % unit_bytes != 0 {
            return None;
        }
        self.sources
            .chunks(unit_bytes)
            .map(|chunk| {
                let head = chunk[0];
                let whole = head % unit_bytes == 0
                    && chunk.iter().enumerate().all(|(offset, &src)| src == head + offset);
                whole.then_some(head / unit_bytes)
            })
            .collect()
    }
}
