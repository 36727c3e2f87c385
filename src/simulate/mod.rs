//! Bit-exact simulation of compiled plans
//!
//! Plans are executed on byte-addressed model registers so they can be
//! checked against the scalar compare-exchange on any host, whatever
//! instruction set it actually has.

pub mod execute;
pub mod reference;
pub mod register;

pub use execute::execute;
pub use reference::{
    apply_network, apply_stage, apply_stage_padded, element_of, pack, reference_compare_exchange,
    reference_network, unpack, Lane,
};
pub use register::Register;
