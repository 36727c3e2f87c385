//! Permutation model: stages, element types and register geometry

pub mod element;
pub mod permutation;
pub mod register;
pub mod stages;

pub use element::{ElementType, ElementWidth, Signedness};
pub use permutation::{pair_side, validate, PairSide, Permutation};
pub use register::RegisterWidth;
pub use stages::Network;
