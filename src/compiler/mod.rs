//! Stage and network compilation

pub mod network;
pub mod plan;
pub mod stage;

pub use network::{compile_network, compile_network_sequential, NetworkCompiler, NetworkPlan};
pub use plan::{InstructionPlan, Operation, Step};
pub use stage::{compile_stage, compile_stage_with, register_for};
