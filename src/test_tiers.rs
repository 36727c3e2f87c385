//! Verification tiers for lanesort
//!
//! Compiled stages are checked against the scalar compare-exchange by
//! running random vectors through the plan simulator. The tier decides how
//! many vectors each stage gets and which network sizes a sweep covers.

use crate::constants::{
    COMMIT_VERIFY_VECTORS, DEFAULT_VERIFY_SEED, ENV_VERIFY_TIER, QUICK_VERIFY_VECTORS,
    RELEASE_VERIFY_VECTORS,
};

/// Verification tier levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VerifyTier {
    /// Quick validation
    /// Used for: TDD, pre-commit hooks
    #[default]
    Quick,

    /// Commit validation
    /// Used for: before commits, CI on every push
    Commit,

    /// Release validation
    /// Used for: release candidates
    Release,
}

impl VerifyTier {
    /// Get tier from `LANESORT_VERIFY_TIER` or default to quick
    pub fn from_env() -> Self {
        match std::env::var(ENV_VERIFY_TIER).as_deref() {
            Ok("quick") => VerifyTier::Quick,
            Ok("commit") => VerifyTier::Commit,
            Ok("release") | Ok("full") => VerifyTier::Release,
            _ => VerifyTier::Quick, // Default to quick for safety
        }
    }

    /// Random vectors checked per compiled stage
    pub fn vectors_per_stage(self) -> usize {
        match self {
            VerifyTier::Quick => QUICK_VERIFY_VECTORS,
            VerifyTier::Commit => COMMIT_VERIFY_VECTORS,
            VerifyTier::Release => RELEASE_VERIFY_VECTORS,
        }
    }

    /// Network sizes a sweep compiles and verifies
    pub fn network_sizes(self) -> Vec<usize> {
        match self {
            VerifyTier::Quick => (2..=16).chain([32, 64]).collect(),
            VerifyTier::Commit => (2..=32).chain([48, 64]).collect(),
            VerifyTier::Release => (2..=64).collect(),
        }
    }

    /// Seed for the random vectors, fixed so failures reproduce
    pub fn seed(self) -> u64 {
        DEFAULT_VERIFY_SEED
    }

    pub fn summary(self) -> String {
        format!(
            "{:?} tier: {} vectors per stage over {} network sizes (seed {})",
            self,
            self.vectors_per_stage(),
            self.network_sizes().len(),
            self.seed()
        )
    }
}
