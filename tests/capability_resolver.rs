//! Tests for capability sets, tiers and primitive resolution

use lanesort::isa::{resolve, BlendStrategy, CompareKind, PermuteStrategy};
use lanesort::{
    CapabilitySet, CompileError, ConfigError, ElementType, Feature, FeatureSet, RegisterWidth, Tier,
};

#[test]
fn test_declared_tier_caps_present_features() {
    let caps = CapabilitySet::new(Tier::Avx2, Tier::Avx512.features());
    assert!(caps.has(Feature::Avx2));
    assert!(!caps.has(Feature::Avx512F));
    assert_eq!(caps.usable(), Tier::Avx2.features());

    let raised = caps.with_tier(Tier::Avx512);
    assert!(raised.has(Feature::Avx512Vbmi));
}

#[test]
fn test_target_feature_overrides() {
    let caps = CapabilitySet::for_tier(Tier::Avx512)
        .with_target_features("-avx512vbmi, -avx512bw")
        .unwrap();
    assert!(!caps.has(Feature::Avx512Vbmi));
    assert!(!caps.has(Feature::Avx512Bw));
    assert!(caps.has(Feature::Avx512Vl));

    let caps = CapabilitySet::new(Tier::Avx2, FeatureSet::empty())
        .with_target_features("+sse2,+ssse3,+sse41")
        .unwrap();
    assert_eq!(
        caps.usable(),
        FeatureSet::of(&[Feature::Sse2, Feature::Ssse3, Feature::Sse41])
    );
}

#[test]
fn test_target_feature_errors() {
    let caps = CapabilitySet::for_tier(Tier::Sse4);
    assert_eq!(
        caps.with_target_features("+avx3"),
        Err(ConfigError::UnknownFeature("avx3".to_string()))
    );
    assert_eq!(
        caps.with_target_features("avx2"),
        Err(ConfigError::MissingSign("avx2".to_string()))
    );
    assert_eq!(caps.with_target_features(""), Ok(caps));
}

#[test]
fn test_tier_names() {
    assert_eq!("sse4".parse::<Tier>(), Ok(Tier::Sse4));
    assert_eq!("standard".parse::<Tier>(), Ok(Tier::Avx2));
    assert_eq!(" AVX512 ".parse::<Tier>(), Ok(Tier::Avx512));
    assert!("avx10".parse::<Tier>().is_err());
    assert!(Tier::Sse4 < Tier::Avx2 && Tier::Avx2 < Tier::Avx512);
}

#[test]
fn test_every_element_resolves_in_every_fitting_register() {
    for tier in Tier::ALL {
        let caps = CapabilitySet::for_tier(tier);
        let registers: &[RegisterWidth] = match tier {
            Tier::Sse4 => &[RegisterWidth::Xmm],
            Tier::Avx2 => &[RegisterWidth::Xmm, RegisterWidth::Ymm],
            Tier::Avx512 => &RegisterWidth::ALL,
        };
        for &register in registers {
            for element in ElementType::ALL {
                let lowering = resolve(&caps, register, element);
                assert!(
                    lowering.is_ok(),
                    "{} in {} at tier {}: {:?}",
                    element,
                    register.name(),
                    tier,
                    lowering
                );
            }
        }
    }
}

#[test]
fn test_register_beyond_tier_is_unsupported() {
    let caps = CapabilitySet::for_tier(Tier::Avx2);
    let err = resolve(&caps, RegisterWidth::Zmm, ElementType::U32).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnsupportedTarget {
            primitive: "zmm",
            ..
        }
    ));
    assert!(err.to_string().contains("avx512f"));
}

#[test]
fn test_sixty_four_bit_compare_lowering() {
    for element in [ElementType::U64, ElementType::I64] {
        let sse = resolve(&CapabilitySet::for_tier(Tier::Sse4), RegisterWidth::Xmm, element).unwrap();
        assert_eq!(
            sse.compare.kind,
            CompareKind::Emulated {
                sign_flip: !element.is_signed()
            }
        );
        assert!(sse.compare.requires.contains(Feature::Sse42));

        let rich = resolve(&CapabilitySet::for_tier(Tier::Avx512), RegisterWidth::Xmm, element).unwrap();
        assert_eq!(rich.compare.kind, CompareKind::Native);
    }
}

#[test]
fn test_sse2_only_byte_compare() {
    // pminub exists in sse2, pminsb needs sse4.1
    let caps = CapabilitySet::new(
        Tier::Sse4,
        FeatureSet::of(&[Feature::Sse2, Feature::Ssse3]),
    );
    let unsigned = resolve(&caps, RegisterWidth::Xmm, ElementType::U8);
    let signed = resolve(&caps, RegisterWidth::Xmm, ElementType::I8);
    assert!(matches!(
        signed,
        Err(CompileError::UnsupportedTarget {
            primitive: "min/max compare",
            ..
        })
    ));
    // the byte compare resolves, but no blend exists without sse4.1
    assert!(matches!(
        unsigned,
        Err(CompileError::UnsupportedTarget {
            primitive: "masked blend",
            ..
        })
    ));
}

#[test]
fn test_lowerings_are_monotonic_in_tier() {
    for element in ElementType::ALL {
        let mut previous: Option<u32> = None;
        for tier in Tier::ALL {
            let lowering = resolve(&CapabilitySet::for_tier(tier), RegisterWidth::Xmm, element).unwrap();
            let permutes = lowering.permute.len() as u32;
            if let Some(count) = previous {
                assert!(permutes >= count, "{} lost permutes at {}", element, tier);
            }
            previous = Some(permutes);
        }
    }
}

#[test]
fn test_cross_lane_candidates_in_order() {
    let caps = CapabilitySet::for_tier(Tier::Avx512);
    let lowering = resolve(&caps, RegisterWidth::Ymm, ElementType::U64).unwrap();
    let order: Vec<PermuteStrategy> = lowering.permute.iter().map(|p| p.strategy).collect();
    assert_eq!(
        order,
        vec![
            PermuteStrategy::DwordImmediate,
            PermuteStrategy::ByteTable,
            PermuteStrategy::QwordImmediate,
            PermuteStrategy::Indexed,
            PermuteStrategy::MaskedUnion,
        ]
    );
    assert_eq!(lowering.richest_blend().unwrap().strategy, BlendStrategy::MaskMove);
}
