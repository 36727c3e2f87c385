//! # lanesort: compare-exchange stages compiled to SIMD instruction plans
//!
//! A sorting network stage is a fixed pairing of lanes. Each lane is
//! compared with its partner and keeps either the smaller or the larger of
//! the two values. This crate turns such a stage into a short, branch-free
//! instruction plan for one vector register.
//!
//! ## Overview
//!
//! Every stage compiles to the same four steps:
//!
//! 1. **Permute**: bring each lane's partner into the same lane of a copy
//! 2. **Min** and **Max** of the input and the permuted copy
//! 3. **Blend**: lanes that keep the minimum take it from the min vector
//!
//! What varies is how each step is lowered. That depends on the element
//! width, the register width, and the instruction-set features available.
//!
//! ## Components
//!
//! - **Permutation model** ([`network`]): validated stages, element types
//!   and register geometry.
//! - **Capability resolver** ([`isa`]): feature flags, tiers, and the
//!   richest lowering each primitive family allows.
//! - **Mask and selector builder** ([`selector`]): shuffle controls,
//!   permute indices, blend literals and the min/max selector.
//! - **Width promotion** ([`promotion`]): re-encodes a stage at a wider
//!   lane width when its pairs move together.
//! - **Stage compiler** ([`compiler`]): picks the cheapest candidate and
//!   assembles the [`InstructionPlan`].
//!
//! ## Usage
//!
//! ```
//! use lanesort::{apply_stage, compile_stage, CapabilitySet, ElementType, Permutation, Tier};
//!
//! // Highest lane first: lane 0 pairs with lane 4 and lane 1 with lane 5
//! let perm = Permutation::new(vec![1, 0, 3, 2, 5, 4]).unwrap();
//! let caps = CapabilitySet::for_tier(Tier::Avx2);
//! let plan = compile_stage(&perm, ElementType::I32, &caps).unwrap();
//!
//! let out = apply_stage(&plan, &[5i32, 3, 8, 1, 9, 2]);
//! assert_eq!(out, vec![5, 2, 8, 1, 9, 3]);
//! ```
//!
//! Whole networks compile in parallel:
//!
//! ```
//! use lanesort::{apply_network, compile_network, CompilerConfig, ElementType, Network, Permutation, Tier};
//!
//! let stage = Permutation::new(vec![2, 3, 0, 1]).unwrap();
//! let network = Network::new(4, vec![stage]).unwrap();
//! let config = CompilerConfig::for_tier(Tier::Sse4);
//! let plan = compile_network(&network, ElementType::U16, &config).unwrap();
//! assert_eq!(plan.stages().len(), 1);
//! assert_eq!(apply_network(&plan, &[4u16, 3, 2, 1]), vec![3, 4, 1, 2]);
//! ```

pub mod compiler;
pub mod config;
pub mod constants;
pub mod error;
pub mod isa;
pub mod network;
pub mod promotion;
pub mod selector;
pub mod simulate;
pub mod test_tiers;

// Re-export primary components
pub use compiler::{
    compile_network, compile_stage, compile_stage_with, InstructionPlan, NetworkCompiler, NetworkPlan,
};
pub use config::CompilerConfig;
pub use error::{CompileError, ConfigError};
pub use isa::{CapabilitySet, Feature, FeatureSet, Tier};
pub use network::{ElementType, ElementWidth, Network, PairSide, Permutation, RegisterWidth, Signedness};
pub use selector::SelectorMask;
pub use simulate::{apply_network, apply_stage, reference_compare_exchange, reference_network};
pub use test_tiers::VerifyTier;

/// Version information for the lanesort library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
