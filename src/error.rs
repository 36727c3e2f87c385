//! Error types for stage compilation and configuration
//!
//! Every error is detected while a plan is being built. A plan that was
//! produced successfully has no failure path when it runs.

use crate::isa::features::{Feature, FeatureSet};

/// Errors that can occur while compiling a compare-exchange stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The permutation is malformed (caller bug)
    InvalidPermutation(String),
    /// The declared capabilities lack a primitive the stage needs
    UnsupportedTarget {
        /// Name of the primitive that could not be lowered
        primitive: &'static str,
        /// Features that would have made the primitive available
        missing: Vec<Feature>,
    },
    /// Every lowering strategy was exhausted for an accepted target
    ///
    /// This indicates the capability resolver over-reported what the
    /// selected primitives can reach.
    NotRepresentable(String),
}

impl CompileError {
    /// True for compiler-internal invariant violations
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::NotRepresentable(_))
    }

    pub(crate) fn unsupported(primitive: &'static str, missing: FeatureSet) -> Self {
        CompileError::UnsupportedTarget {
            primitive,
            missing: missing.iter().collect(),
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::InvalidPermutation(msg) => write!(f, "Invalid permutation: {}", msg),
            CompileError::UnsupportedTarget { primitive, missing } => {
                let names: Vec<&str> = missing.iter().map(|feature| feature.name()).collect();
                write!(
                    f,
                    "Unsupported target: {} requires {}",
                    primitive,
                    names.join(" + ")
                )
            }
            CompileError::NotRepresentable(msg) => {
                write!(f, "Internal error: stage not representable: {}", msg)
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Errors raised while parsing capability configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A feature name that does not match any known ISA extension
    UnknownFeature(String),
    /// A tier name that does not match any known tier
    UnknownTier(String),
    /// A target-feature entry without a leading `+` or `-`
    MissingSign(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownFeature(name) => write!(f, "Unknown ISA feature: {}", name),
            ConfigError::UnknownTier(name) => {
                write!(f, "Unknown capability tier: {} (expected sse4, avx2 or avx512)", name)
            }
            ConfigError::MissingSign(entry) => {
                write!(f, "Target feature '{}' must start with '+' or '-'", entry)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
