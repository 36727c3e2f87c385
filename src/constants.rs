//! Centralized constants for the lanesort stage compiler
//!
//! This module contains the hardware geometry and encoding constants used
//! throughout the codebase. All new constants should be added here rather
//! than scattered throughout the code.

// ============================================================================
// REGISTER GEOMETRY
// ============================================================================

/// Width in bytes of an xmm register
pub const XMM_BYTES: usize = 16;

/// Width in bytes of a ymm register
pub const YMM_BYTES: usize = 32;

/// Width in bytes of a zmm register
pub const ZMM_BYTES: usize = 64;

/// Smallest register a stage is compiled into
pub const MIN_REGISTER_BYTES: usize = XMM_BYTES;

/// Largest register a stage can be compiled into
pub const MAX_REGISTER_BYTES: usize = ZMM_BYTES;

/// Size of the sub-register boundary that in-lane shuffles cannot cross
pub const LANE_GROUP_BYTES: usize = 16;

/// Alignment of simulated register storage
pub const REGISTER_ALIGNMENT: usize = 64;

// ============================================================================
// CONTROL VECTOR ENCODING
// ============================================================================

/// `pshufb` control byte that zeroes the destination byte
pub const SHUFFLE_ZERO_BYTE: u8 = 0x80;

/// `pblendvb` selector byte that picks the second operand
pub const BLENDV_SELECT_BYTE: u8 = 0x80;

/// `vpermq` immediate that swaps the two 128-bit halves of a ymm register
pub const SWAP_HALVES_IMM: u8 = 0x4e;

/// Number of bits an immediate uses to select one lane out of four
pub const IMM_SELECTOR_BITS: u32 = 2;

// ============================================================================
// PLAN COST WEIGHTS
// ============================================================================

/// Cost of a single vector instruction
pub const INSTRUCTION_COST: u32 = 1;

/// Cost of loading a literal control vector from the constant pool
pub const CONSTANT_LOAD_COST: u32 = 1;

/// Cost of moving an immediate mask into an opmask register
pub const MASK_REGISTER_COST: u32 = 1;

// ============================================================================
// VERIFICATION SWEEPS
// ============================================================================

/// Random vectors per stage in the quick verification tier
pub const QUICK_VERIFY_VECTORS: usize = 1_000;

/// Random vectors per stage in the commit verification tier
pub const COMMIT_VERIFY_VECTORS: usize = 10_000;

/// Random vectors per stage in the release verification tier
pub const RELEASE_VERIFY_VECTORS: usize = 100_000;

/// Seed used by verification sweeps when none is supplied
pub const DEFAULT_VERIFY_SEED: u64 = 42;

// ============================================================================
// ENVIRONMENT OVERRIDES
// ============================================================================

/// Environment variable selecting the declared capability tier
pub const ENV_TIER: &str = "LANESORT_TIER";

/// Environment variable carrying explicit `+feature,-feature` overrides
pub const ENV_TARGET_FEATURES: &str = "LANESORT_TARGET_FEATURES";

/// Environment variable selecting the verification tier
pub const ENV_VERIFY_TIER: &str = "LANESORT_VERIFY_TIER";
