//! Named ISA extensions and the tiers that group them

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// An x86 SIMD instruction-set extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    Sse2,
    Ssse3,
    Sse41,
    Sse42,
    Avx,
    Avx2,
    Avx512F,
    Avx512Vl,
    Avx512Bw,
    Avx512Vbmi,
}

impl Feature {
    pub const ALL: [Feature; 10] = [
        Feature::Sse2,
        Feature::Ssse3,
        Feature::Sse41,
        Feature::Sse42,
        Feature::Avx,
        Feature::Avx2,
        Feature::Avx512F,
        Feature::Avx512Vl,
        Feature::Avx512Bw,
        Feature::Avx512Vbmi,
    ];

    /// Name as used in compiler target-feature strings
    pub fn name(self) -> &'static str {
        match self {
            Feature::Sse2 => "sse2",
            Feature::Ssse3 => "ssse3",
            Feature::Sse41 => "sse4.1",
            Feature::Sse42 => "sse4.2",
            Feature::Avx => "avx",
            Feature::Avx2 => "avx2",
            Feature::Avx512F => "avx512f",
            Feature::Avx512Vl => "avx512vl",
            Feature::Avx512Bw => "avx512bw",
            Feature::Avx512Vbmi => "avx512vbmi",
        }
    }

    /// Lowest tier that includes this feature
    pub fn tier(self) -> Tier {
        match self {
            Feature::Sse2 | Feature::Ssse3 | Feature::Sse41 | Feature::Sse42 => Tier::Sse4,
            Feature::Avx | Feature::Avx2 => Tier::Avx2,
            Feature::Avx512F | Feature::Avx512Vl | Feature::Avx512Bw | Feature::Avx512Vbmi => {
                Tier::Avx512
            }
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Feature::ALL
            .into_iter()
            // Accept "sse41" as well as "sse4.1".
            .find(|f| f.name() == wanted || f.name().replace('.', "") == wanted)
            .ok_or_else(|| ConfigError::UnknownFeature(s.trim().to_string()))
    }
}

/// A set of ISA features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeatureSet(u16);

impl FeatureSet {
    pub const fn empty() -> Self {
        FeatureSet(0)
    }

    pub fn of(features: &[Feature]) -> Self {
        features
            .iter()
            .fold(FeatureSet::empty(), |set, &feature| set.with(feature))
    }

    pub fn with(self, feature: Feature) -> Self {
        FeatureSet(self.0 | feature.bit())
    }

    pub fn without(self, feature: Feature) -> Self {
        FeatureSet(self.0 & !feature.bit())
    }

    pub fn union(self, other: FeatureSet) -> Self {
        FeatureSet(self.0 | other.0)
    }

    pub fn contains(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    pub fn contains_all(self, other: FeatureSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Features of `self` that `available` lacks
    pub fn missing_from(self, available: FeatureSet) -> FeatureSet {
        FeatureSet(self.0 & !available.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Feature> {
        Feature::ALL.into_iter().filter(move |f| self.contains(*f))
    }

    /// Lowest tier that provides every feature in the set
    pub fn minimum_tier(self) -> Tier {
        self.iter().map(Feature::tier).max().unwrap_or(Tier::Sse4)
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Feature::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Capability tiers from minimal to richest
///
/// Each tier only adds features to the one below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// SSE2 through SSE4.2, 128-bit registers
    Sse4,
    /// Adds AVX and AVX2, 256-bit registers
    Avx2,
    /// Adds AVX-512 F, VL, BW and VBMI, 512-bit registers
    Avx512,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Sse4, Tier::Avx2, Tier::Avx512];

    /// Every feature the tier provides
    pub fn features(self) -> FeatureSet {
        Feature::ALL
            .into_iter()
            .filter(|f| f.tier() <= self)
            .fold(FeatureSet::empty(), FeatureSet::with)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Sse4 => "sse4",
            Tier::Avx2 => "avx2",
            Tier::Avx512 => "avx512",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse4" | "minimum" => Ok(Tier::Sse4),
            "avx2" | "standard" => Ok(Tier::Avx2),
            "avx512" | "richest" => Ok(Tier::Avx512),
            _ => Err(ConfigError::UnknownTier(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_only_add_features() {
        assert!(Tier::Avx2.features().contains_all(Tier::Sse4.features()));
        assert!(Tier::Avx512.features().contains_all(Tier::Avx2.features()));
        assert_eq!(Tier::Sse4.features().len(), 4);
        assert_eq!(Tier::Avx512.features().len(), Feature::ALL.len());
    }

    #[test]
    fn test_parse_feature_names() {
        assert_eq!("sse4.1".parse::<Feature>(), Ok(Feature::Sse41));
        assert_eq!("SSE41".parse::<Feature>(), Ok(Feature::Sse41));
        assert_eq!("avx512vbmi".parse::<Feature>(), Ok(Feature::Avx512Vbmi));
        assert_eq!(
            "neon".parse::<Feature>(),
            Err(ConfigError::UnknownFeature("neon".to_string()))
        );
    }

    #[test]
    fn test_minimum_tier() {
        let set = FeatureSet::of(&[Feature::Sse41, Feature::Avx2]);
        assert_eq!(set.minimum_tier(), Tier::Avx2);
        assert_eq!(FeatureSet::empty().minimum_tier(), Tier::Sse4);
    }

    #[test]
    fn test_missing_from() {
        let needed = FeatureSet::of(&[Feature::Avx512Bw, Feature::Avx512Vl]);
        let have = FeatureSet::of(&[Feature::Avx512Vl]);
        assert_eq!(
            needed.missing_from(have).iter().collect::<Vec<_>>(),
            vec![Feature::Avx512Bw]
        );
    }
}
