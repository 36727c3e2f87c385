//! Min/max selector masks

use crate::constants::{BLENDV_SELECT_BYTE, LANE_GROUP_BYTES};
use crate::isa::{BlendPrimitive, BlendStrategy, MaskGranularity};
use crate::network::{ElementWidth, Permutation};
use crate::selector::ops::BlendOp;

/// Which lanes keep the minimum, at the granularity of the blend used
///
/// A set bit selects the minimum. Plans only carry masks produced by
/// [`SelectorMask::build`], so a compiled plan's selector always matches
/// its permutation. A mask written out by hand is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorMask {
    /// One bit per lane
    PerLane { bits: u64, lanes: usize },
    /// One bit per byte, repeated over the bytes of each lane
    PerByte { bits: u64, bytes: usize },
    /// Two bits per lane
    PerPair { bits: u64, lanes: usize },
}

/// Repeats each of the low `lanes` bits `factor` times
fn replicate(bits: u64, lanes: usize, factor: usize) -> u64 {
    let run = if factor >= 64 { u64::MAX } else { (1u64 << factor) - 1 };
    (0..lanes)
        .filter(|lane| bits & (1u64 << lane) != 0)
        .fold(0u64, |acc, lane| acc | (run << (lane * factor)))
}

impl SelectorMask {
    /// Builds the selector of `perm` over `width`-wide lanes
    pub fn build(perm: &Permutation, width: ElementWidth, granularity: MaskGranularity) -> Self {
        let lanes = perm.lanes();
        let low = perm.low_lanes();
        match granularity {
            MaskGranularity::Lane => SelectorMask::PerLane { bits: low, lanes },
            MaskGranularity::Byte => SelectorMask::PerByte {
                bits: replicate(low, lanes, width.bytes()),
                bytes: lanes * width.bytes(),
            },
            MaskGranularity::Pair => SelectorMask::PerPair {
                bits: replicate(low, lanes, 2),
                lanes,
            },
        }
    }

    pub fn bits(&self) -> u64 {
        match *self {
            SelectorMask::PerLane { bits, .. }
            | SelectorMask::PerByte { bits, .. }
            | SelectorMask::PerPair { bits, .. } => bits,
        }
    }

    /// Number of meaningful bits
    pub fn len(&self) -> usize {
        match *self {
            SelectorMask::PerLane { lanes, .. } => lanes,
            SelectorMask::PerByte { bytes, .. } => bytes,
            SelectorMask::PerPair { lanes, .. } => 2 * lanes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn granularity(&self) -> MaskGranularity {
        match self {
            SelectorMask::PerLane { .. } => MaskGranularity::Lane,
            SelectorMask::PerByte { .. } => MaskGranularity::Byte,
            SelectorMask::PerPair { .. } => MaskGranularity::Pair,
        }
    }

    /// Collapses the mask back to one bit per `width`-wide lane
    pub fn lane_bits(&self, width: ElementWidth) -> u64 {
        let (bits, stride, lanes) = match *self {
            SelectorMask::PerLane { bits, lanes } => (bits, 1, lanes),
            SelectorMask::PerByte { bits, bytes } => (bits, width.bytes(), bytes / width.bytes()),
            SelectorMask::PerPair { bits, lanes } => (bits, 2, lanes),
        };
        (0..lanes)
            .filter(|lane| bits & (1u64 << (lane * stride)) != 0)
            .fold(0u64, |acc, lane| acc | (1u64 << lane))
    }

    /// True when lane `lane` of a `width`-wide register keeps the minimum
    pub fn is_low(&self, lane: usize, width: ElementWidth) -> bool {
        self.lane_bits(width) & (1u64 << lane) != 0
    }
}

/// Encodes the selector as the literal operand of a blend primitive
///
/// Returns `None` when the primitive cannot express the selector, which
/// only happens for a `pblendw` immediate whose lane groups disagree.
pub fn blend_op(
    primitive: &BlendPrimitive,
    selector: &SelectorMask,
    width: ElementWidth,
) -> Option<BlendOp> {
    if primitive.granularity != selector.granularity() {
        return None;
    }
    let bits = selector.bits();
    match (primitive.strategy, *selector) {
        (BlendStrategy::MaskMove, SelectorMask::PerLane { .. }) => Some(BlendOp::MaskMove {
            unit: width,
            mask: bits,
        }),
        (BlendStrategy::WordImmediate, SelectorMask::PerLane { lanes, .. }) => {
            // eight word lanes per group, one immediate for all groups
            let per_group = LANE_GROUP_BYTES / 2;
            let first = (bits & 0xff) as u8;
            let shared = (0..lanes / per_group)
                .all(|group| ((bits >> (group * per_group)) & 0xff) as u8 == first);
            shared.then_some(BlendOp::WordImmediate(first))
        }
        (BlendStrategy::WordImmediate, SelectorMask::PerPair { .. }) => {
            Some(BlendOp::WordImmediate(bits as u8))
        }
        (BlendStrategy::DwordImmediate, SelectorMask::PerLane { .. } | SelectorMask::PerPair { .. }) => {
            Some(BlendOp::DwordImmediate(bits as u8))
        }
        (BlendStrategy::ByteVariable, SelectorMask::PerByte { bytes, .. }) => {
            let selector = (0..bytes)
                .map(|byte| if bits & (1u64 << byte) != 0 { BLENDV_SELECT_BYTE } else { 0 })
                .collect();
            Some(BlendOp::ByteVariable(selector))
        }
        _ => None,
    }
}
