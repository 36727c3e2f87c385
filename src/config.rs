//! Compiler configuration

use crate::constants::{ENV_TARGET_FEATURES, ENV_TIER};
use crate::error::ConfigError;
use crate::isa::{CapabilitySet, Tier};

/// Configuration for compiling stages and networks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Capabilities plans are compiled against
    pub capabilities: CapabilitySet,

    /// Whether width promotion may re-encode the permute step
    pub promotion: bool,

    /// Worker threads for network compilation
    pub threads: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            capabilities: CapabilitySet::detect(),
            promotion: true,
            threads: num_cpus::get(), // Use all available cores
        }
    }
}

impl CompilerConfig {
    /// Create a config that assumes every feature of `tier`
    pub fn for_tier(tier: Tier) -> Self {
        Self {
            capabilities: CapabilitySet::for_tier(tier),
            ..Self::default()
        }
    }

    /// Create a config from explicit capabilities
    pub fn with_capabilities(capabilities: CapabilitySet) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Detected defaults with `LANESORT_TIER` and `LANESORT_TARGET_FEATURES` applied
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(ENV_TIER) {
            let tier: Tier = value.parse()?;
            log::info!("{}={}: declaring capability tier {}", ENV_TIER, value, tier);
            config.capabilities = config.capabilities.with_tier(tier);
        }

        if let Ok(value) = std::env::var(ENV_TARGET_FEATURES) {
            config.capabilities = config.capabilities.with_target_features(&value)?;
            log::info!(
                "{}={}: usable features now {}",
                ENV_TARGET_FEATURES,
                value,
                config.capabilities.usable()
            );
        }

        Ok(config)
    }

    pub fn without_promotion(self) -> Self {
        Self {
            promotion: false,
            ..self
        }
    }

    pub fn with_threads(self, threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            ..self
        }
    }
}
