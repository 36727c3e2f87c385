//! Concrete permute and blend operations with their control literals

use crate::constants::{
    CONSTANT_LOAD_COST, INSTRUCTION_COST, MASK_REGISTER_COST, SWAP_HALVES_IMM,
};
use crate::isa::{BlendStrategy, PermuteStrategy};
use crate::network::{ElementWidth, RegisterWidth};

/// Identity immediate for a four-way lane selector
pub const IDENTITY_IMM: u8 = 0xe4;

/// One partial shuffle of a masked union
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnionPart {
    /// Lane groups the input is rotated down by before shuffling
    pub rotation: usize,
    /// `pshufb` control; bytes owned by other parts are zeroed
    pub control: Vec<u8>,
}

impl UnionPart {
    /// Immediate of the group rotation instruction, `None` for no rotation
    ///
    /// A ymm rotation is `vpermq` swapping halves; a zmm rotation is
    /// `vshufi64x2` with the same source in both operands.
    pub fn rotation_immediate(&self, register: RegisterWidth) -> Option<u8> {
        if self.rotation == 0 {
            return None;
        }
        match register {
            RegisterWidth::Xmm => None,
            RegisterWidth::Ymm => Some(SWAP_HALVES_IMM),
            RegisterWidth::Zmm => {
                let groups = register.lane_groups();
                Some((0..groups).fold(0u8, |imm, dst| {
                    imm | ((((dst + self.rotation) % groups) as u8) << (2 * dst))
                }))
            }
        }
    }
}

/// The data-movement step of a compare-exchange
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PermuteOp {
    /// `pshufd` with one immediate shared by every lane group
    ShuffleDwords { imm: u8 },
    /// `pshuflw` then `pshufhw`
    ShuffleWords { lo: u8, hi: u8 },
    /// `pshufb` with a byte control vector
    ShuffleBytes { control: Vec<u8> },
    /// `vpermq` immediate; zmm applies it to each 256-bit half
    PermuteQwords { imm: u8 },
    /// `vpermb`, `vpermw`, `vpermd` or `vpermq` with an index vector
    PermuteIndexed { unit: ElementWidth, indices: Vec<u8> },
    /// OR of zeroing shuffles over rotated copies of the input
    MaskedUnion { parts: Vec<UnionPart> },
}

impl PermuteOp {
    pub fn strategy(&self) -> PermuteStrategy {
        match self {
            PermuteOp::ShuffleDwords { .. } => PermuteStrategy::DwordImmediate,
            PermuteOp::ShuffleWords { .. } => PermuteStrategy::WordImmediate,
            PermuteOp::ShuffleBytes { .. } => PermuteStrategy::ByteTable,
            PermuteOp::PermuteQwords { .. } => PermuteStrategy::QwordImmediate,
            PermuteOp::PermuteIndexed { .. } => PermuteStrategy::Indexed,
            PermuteOp::MaskedUnion { .. } => PermuteStrategy::MaskedUnion,
        }
    }

    /// Estimated instruction count, constant loads included
    pub fn cost(&self) -> u32 {
        match self {
            PermuteOp::ShuffleDwords { .. } | PermuteOp::PermuteQwords { .. } => INSTRUCTION_COST,
            PermuteOp::ShuffleWords { lo, hi } => {
                let moved = [*lo, *hi].iter().filter(|&&imm| imm != IDENTITY_IMM).count() as u32;
                INSTRUCTION_COST * moved.max(1)
            }
            PermuteOp::ShuffleBytes { .. } | PermuteOp::PermuteIndexed { .. } => {
                CONSTANT_LOAD_COST + INSTRUCTION_COST
            }
            PermuteOp::MaskedUnion { parts } => {
                let shuffles = parts.len() as u32 * (CONSTANT_LOAD_COST + INSTRUCTION_COST);
                let rotations = parts.iter().filter(|p| p.rotation != 0).count() as u32;
                let ors = parts.len().saturating_sub(1) as u32;
                shuffles + (rotations + ors) * INSTRUCTION_COST
            }
        }
    }

    /// Literal control vectors the operation loads
    pub fn constants(&self) -> Vec<&[u8]> {
        match self {
            PermuteOp::ShuffleBytes { control } => vec![control.as_slice()],
            PermuteOp::PermuteIndexed { indices, .. } => vec![indices.as_slice()],
            PermuteOp::MaskedUnion { parts } => parts.iter().map(|p| p.control.as_slice()).collect(),
            _ => Vec::new(),
        }
    }

    /// True when no byte crosses a 16-byte lane group
    pub fn is_lane_local(&self) -> bool {
        !self.strategy().crosses_groups()
    }
}

/// Recombination of the min and max vectors
///
/// Selected lanes or bytes take the minimum, the rest take the maximum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlendOp {
    /// `kmov` then `vmovdqu{8,16,32,64}` of min into max under the mask
    MaskMove { unit: ElementWidth, mask: u64 },
    /// `pblendw` immediate, applied to every lane group
    WordImmediate(u8),
    /// `vpblendd` immediate
    DwordImmediate(u8),
    /// `pblendvb` with a byte selector vector
    ByteVariable(Vec<u8>),
}

impl BlendOp {
    pub fn strategy(&self) -> BlendStrategy {
        match self {
            BlendOp::MaskMove { .. } => BlendStrategy::MaskMove,
            BlendOp::WordImmediate(_) => BlendStrategy::WordImmediate,
            BlendOp::DwordImmediate(_) => BlendStrategy::DwordImmediate,
            BlendOp::ByteVariable(_) => BlendStrategy::ByteVariable,
        }
    }

    pub fn cost(&self) -> u32 {
        match self {
            BlendOp::MaskMove { .. } => MASK_REGISTER_COST + INSTRUCTION_COST,
            BlendOp::WordImmediate(_) | BlendOp::DwordImmediate(_) => INSTRUCTION_COST,
            BlendOp::ByteVariable(_) => CONSTANT_LOAD_COST + INSTRUCTION_COST,
        }
    }
}
