//! Declared and detected target capabilities

use crate::error::ConfigError;
use crate::isa::features::{Feature, FeatureSet, Tier};

/// The ISA features a stage may be compiled against
///
/// A feature is usable only when it is present and its tier does not exceed
/// the declared tier. Detected hardware beyond the declared tier is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
    tier: Tier,
    present: FeatureSet,
}

impl CapabilitySet {
    /// Assumes every feature up to and including `tier`
    pub fn for_tier(tier: Tier) -> Self {
        CapabilitySet {
            tier,
            present: tier.features(),
        }
    }

    /// Declares `tier` over an explicit feature set
    pub fn new(tier: Tier, present: FeatureSet) -> Self {
        CapabilitySet { tier, present }
    }

    /// Capabilities of the host CPU, capped at the richest tier
    pub fn detect() -> Self {
        CapabilitySet {
            tier: Tier::Avx512,
            present: detect_features(),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Re-declares the tier, keeping the present features
    pub fn with_tier(self, tier: Tier) -> Self {
        CapabilitySet { tier, ..self }
    }

    pub fn with_feature(self, feature: Feature) -> Self {
        CapabilitySet {
            present: self.present.with(feature),
            ..self
        }
    }

    pub fn without_feature(self, feature: Feature) -> Self {
        CapabilitySet {
            present: self.present.without(feature),
            ..self
        }
    }

    /// Applies a target-feature string such as `"+avx2,-avx512vbmi"`
    pub fn with_target_features(self, spec: &str) -> Result<Self, ConfigError> {
        spec.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .try_fold(self, |caps, entry| {
                let (enable, name) = if let Some(name) = entry.strip_prefix('+') {
                    (true, name)
                } else if let Some(name) = entry.strip_prefix('-') {
                    (false, name)
                } else {
                    return Err(ConfigError::MissingSign(entry.to_string()));
                };
                let feature: Feature = name.parse()?;
                Ok(if enable {
                    caps.with_feature(feature)
                } else {
                    caps.without_feature(feature)
                })
            })
    }

    /// Features that are both present and allowed by the tier
    pub fn usable(&self) -> FeatureSet {
        self.present
            .iter()
            .filter(|f| f.tier() <= self.tier)
            .fold(FeatureSet::empty(), FeatureSet::with)
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.usable().contains(feature)
    }

    pub fn supports(&self, required: FeatureSet) -> bool {
        self.usable().contains_all(required)
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        CapabilitySet::detect()
    }
}

/// Detects the SIMD features of the running CPU
pub fn detect_features() -> FeatureSet {
    #[cfg(target_arch = "x86_64")]
    {
        let checks = [
            (Feature::Sse2, std::is_x86_feature_detected!("sse2")),
            (Feature::Ssse3, std::is_x86_feature_detected!("ssse3")),
            (Feature::Sse41, std::is_x86_feature_detected!("sse4.1")),
            (Feature::Sse42, std::is_x86_feature_detected!("sse4.2")),
            (Feature::Avx, std::is_x86_feature_detected!("avx")),
            (Feature::Avx2, std::is_x86_feature_detected!("avx2")),
            (Feature::Avx512F, std::is_x86_feature_detected!("avx512f")),
            (Feature::Avx512Vl, std::is_x86_feature_detected!("avx512vl")),
            (Feature::Avx512Bw, std::is_x86_feature_detected!("avx512bw")),
            (Feature::Avx512Vbmi, std::is_x86_feature_detected!("avx512vbmi")),
        ];
        return checks
            .into_iter()
            .filter(|(_, detected)| *detected)
            .fold(FeatureSet::empty(), |set, (feature, _)| set.with(feature));
    }

    // Non-x86 hosts can still compile plans against a declared tier.
    #[allow(unreachable_code)]
    FeatureSet::empty()
}
