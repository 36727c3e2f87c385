//! Instruction-set capabilities and the lowerings they allow

pub mod capability;
pub mod features;
pub mod resolver;

pub use capability::{detect_features, CapabilitySet};
pub use features::{Feature, FeatureSet, Tier};
pub use resolver::{
    resolve, BlendPrimitive, BlendStrategy, CompareKind, CompareLowering, Lowering, MaskGranularity,
    PermutePrimitive, PermuteStrategy,
};
