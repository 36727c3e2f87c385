//! Whole-network compilation
//!
//! Stages compile independently, so a network is compiled on a rayon pool.
//! [`NetworkCompiler`] keeps a dedicated pool alive across networks.
//! Results are collected in stage order and match sequential compilation
//! exactly.

use rayon::prelude::*;

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::network::{ElementType, Network};

use super::plan::InstructionPlan;
use super::stage::compile_stage_with;

/// Compiled sorting network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlan {
    size: usize,
    element: ElementType,
    stages: Vec<InstructionPlan>,
}

impl NetworkPlan {
    /// Number of sorted elements
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    pub fn stages(&self) -> &[InstructionPlan] {
        &self.stages
    }

    /// Total estimated instruction count
    pub fn cost(&self) -> u32 {
        self.stages.iter().map(InstructionPlan::cost).sum()
    }

    /// Number of stages whose permute was promoted
    pub fn promoted_stages(&self) -> usize {
        self.stages.iter().filter(|plan| plan.is_promoted()).count()
    }
}

/// Compiles every stage of a network on the current rayon pool
///
/// That is the global pool unless the caller runs inside
/// [`rayon::ThreadPool::install`]. Use [`NetworkCompiler`] to honor
/// [`CompilerConfig::threads`]. The first failing stage, in stage order,
/// determines the error.
pub fn compile_network(
    network: &Network,
    element: ElementType,
    config: &CompilerConfig,
) -> Result<NetworkPlan, CompileError> {
    let stages = network
        .stages()
        .par_iter()
        .map(|stage| compile_stage_with(stage, element, config))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "compiled {}-element network of depth {} for {}",
        network.size(),
        network.depth(),
        element
    );

    Ok(NetworkPlan {
        size: network.size(),
        element,
        stages,
    })
}

/// Compiles networks on a pool of [`CompilerConfig::threads`] workers
///
/// The pool is built once and reused for every network.
#[derive(Debug)]
pub struct NetworkCompiler {
    config: CompilerConfig,
    pool: Option<rayon::ThreadPool>,
}

impl NetworkCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!(
                    "Failed to build a {}-thread pool ({}), using the global pool",
                    config.threads,
                    e
                );
                None
            }
        };
        NetworkCompiler { config, pool }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Worker threads actually compiling stages
    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }

    pub fn compile(&self, network: &Network, element: ElementType) -> Result<NetworkPlan, CompileError> {
        match &self.pool {
            Some(pool) => pool.install(|| compile_network(network, element, &self.config)),
            None => compile_network(network, element, &self.config),
        }
    }
}

/// Compiles every stage on the calling thread
pub fn compile_network_sequential(
    network: &Network,
    element: ElementType,
    config: &CompilerConfig,
) -> Result<NetworkPlan, CompileError> {
    let stages = network
        .stages()
        .iter()
        .map(|stage| compile_stage_with(stage, element, config))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NetworkPlan {
        size: network.size(),
        element,
        stages,
    })
}
