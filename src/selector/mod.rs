//! Mask and selector builder
//!
//! Derives everything a compiled stage loads from the permutation alone:
//! the min/max selector mask and the shuffle, permute and blend controls.
//!
//! Data movement is first expanded into a [`ByteRoute`]. Each permute
//! strategy then tries to encode that route:
//!
//! 1. **Lane-local immediates** (`pshufd`, `pshuflw`/`pshufhw`) when every
//!    lane group shares one pattern.
//! 2. **Lane-local byte table** (`pshufb`) when no byte leaves its group.
//! 3. **Native cross-lane** (`vpermq` immediate, `vperm*` index vector).
//! 4. **Masked union** of zeroing `pshufb` passes over group-rotated copies
//!    of the input, OR-ed together.

pub mod cross_lane;
pub mod mask;
pub mod ops;
pub mod route;
pub mod shuffle;

pub use mask::{blend_op, SelectorMask};
pub use ops::{BlendOp, PermuteOp, UnionPart};
pub use route::ByteRoute;

use crate::isa::{PermutePrimitive, PermuteStrategy};
use crate::network::RegisterWidth;

/// Encodes `route` with one permute primitive
///
/// Returns `None` when the primitive cannot express the route.
pub fn build_permute(
    primitive: &PermutePrimitive,
    route: &ByteRoute,
    register: RegisterWidth,
) -> Option<PermuteOp> {
    match primitive.strategy {
        PermuteStrategy::DwordImmediate => {
            shuffle::dword_immediate(route).map(|imm| PermuteOp::ShuffleDwords { imm })
        }
        PermuteStrategy::WordImmediate => {
            shuffle::word_immediates(route).map(|(lo, hi)| PermuteOp::ShuffleWords { lo, hi })
        }
        PermuteStrategy::ByteTable => {
            shuffle::byte_table(route).map(|control| PermuteOp::ShuffleBytes { control })
        }
        PermuteStrategy::QwordImmediate => {
            cross_lane::qword_immediate(route, register).map(|imm| PermuteOp::PermuteQwords { imm })
        }
        PermuteStrategy::Indexed => cross_lane::permute_indices(route, primitive.unit)
            .map(|indices| PermuteOp::PermuteIndexed {
                unit: primitive.unit,
                indices,
            }),
        PermuteStrategy::MaskedUnion => Some(PermuteOp::MaskedUnion {
            parts: cross_lane::masked_union(route),
        }),
    }
}
