//! Tests for stage and network compilation

mod common;

use common::*;
use lanesort::compiler::{compile_network_sequential, register_for, Operation};
use lanesort::isa::{BlendStrategy, CompareKind};
use lanesort::{
    apply_stage, compile_network, compile_stage, compile_stage_with, CapabilitySet, CompileError,
    CompilerConfig, ElementType, Feature, NetworkCompiler, Permutation, RegisterWidth, Tier,
};

#[test]
fn test_six_lane_stage_end_to_end() {
    let perm = Permutation::new(vec![1, 0, 3, 2, 5, 4]).unwrap();
    for tier in Tier::ALL {
        let plan = compile_stage(&perm, ElementType::I16, &CapabilitySet::for_tier(tier)).unwrap();
        assert_eq!(plan.selector().lane_bits(plan.element().width), 0x3);
        assert_eq!(apply_stage(&plan, &[5i16, 3, 8, 1, 9, 2]), vec![5, 2, 8, 1, 9, 3]);
    }
}

#[test]
fn test_padded_generator_form() {
    // the same stage written as an 8-lane constant with two padding lanes
    let perm = Permutation::with_logical_size(vec![7, 6, 1, 0, 3, 2, 5, 4], 6).unwrap();
    let plan = compile_stage(&perm, ElementType::U16, &CapabilitySet::for_tier(Tier::Sse4)).unwrap();
    assert_eq!(plan.register(), RegisterWidth::Xmm);
    assert_eq!(plan.selector().lane_bits(plan.element().width), 0x3);
    assert_eq!(apply_stage(&plan, &[5u16, 3, 8, 1, 9, 2]), vec![5, 2, 8, 1, 9, 3]);

    for tier in Tier::ALL {
        let plan = compile_stage(&perm, ElementType::U8, &CapabilitySet::for_tier(tier)).unwrap();
        assert_eq!(plan.register(), RegisterWidth::Xmm);
        assert_eq!(plan.selector().lane_bits(plan.element().width), 0x3);
        assert_eq!(apply_stage(&plan, &[5u8, 3, 8, 1, 9, 2]), vec![5, 2, 8, 1, 9, 3]);
    }
}

#[test]
fn test_plans_have_four_steps_in_order() {
    let perm = Permutation::new(BITONIC_8[1].to_vec()).unwrap();
    let plan = compile_stage(&perm, ElementType::U64, &CapabilitySet::for_tier(Tier::Avx512)).unwrap();
    let steps = plan.steps();
    assert_eq!(steps.len(), 4);
    assert!(matches!(steps[0].operation, Operation::Permute(_)));
    assert!(matches!(steps[1].operation, Operation::Min(_)));
    assert!(matches!(steps[2].operation, Operation::Max(_)));
    assert!(matches!(steps[3].operation, Operation::Blend { .. }));
    assert_eq!(plan.register(), RegisterWidth::Zmm);
    for step in steps {
        assert_eq!(step.tier, step.requires.minimum_tier());
    }
}

#[test]
fn test_register_choice() {
    let perm = Permutation::identity(8).unwrap();
    assert_eq!(register_for(&perm, ElementType::U8).unwrap(), RegisterWidth::Xmm);
    assert_eq!(register_for(&perm, ElementType::U32).unwrap(), RegisterWidth::Ymm);
    assert_eq!(register_for(&perm, ElementType::U64).unwrap(), RegisterWidth::Zmm);

    let wide = Permutation::identity(9).unwrap();
    let err = register_for(&wide, ElementType::I64).unwrap_err();
    assert!(matches!(err, CompileError::InvalidPermutation(_)));
}

#[test]
fn test_unsupported_target_names_the_primitive() {
    let perm = Permutation::new(BITONIC_16[0].to_vec()).unwrap();
    let err = compile_stage(&perm, ElementType::U16, &CapabilitySet::for_tier(Tier::Sse4)).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnsupportedTarget {
            primitive: "ymm",
            missing: vec![Feature::Avx],
        }
    );
    assert!(!err.is_internal());
    assert!(err.to_string().contains("ymm requires avx"));
}

#[test]
fn test_plan_features_fit_the_capabilities() {
    let network = fixture(&BITONIC_16);
    for tier in Tier::ALL {
        let caps = CapabilitySet::for_tier(tier);
        for element in ElementType::ALL {
            for stage in network.stages() {
                let Ok(plan) = compile_stage(stage, element, &caps) else {
                    continue;
                };
                assert!(caps.supports(plan.required_features()));
                assert!(plan.tier() <= tier);
            }
        }
    }
}

#[test]
fn test_compilation_is_deterministic() {
    let caps = CapabilitySet::for_tier(Tier::Avx512);
    for stage in BITONIC_16.iter() {
        let perm = Permutation::new(stage.to_vec()).unwrap();
        let first = compile_stage(&perm, ElementType::I8, &caps).unwrap();
        let second = compile_stage(&perm, ElementType::I8, &caps).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
}

#[test]
fn test_sixty_four_bit_lowering_changes_with_tier() {
    let perm = Permutation::new(BITONIC_8[3].to_vec()).unwrap();
    let caps = CapabilitySet::for_tier(Tier::Avx512).without_feature(Feature::Avx512F);
    // eight u64 lanes need a zmm register
    let err = compile_stage(&perm, ElementType::U64, &caps).unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedTarget { .. }));

    let four = Permutation::new(vec![0, 1, 2, 3]).unwrap();
    let poor = compile_stage(&four, ElementType::U64, &CapabilitySet::for_tier(Tier::Avx2)).unwrap();
    let rich = compile_stage(&four, ElementType::U64, &CapabilitySet::for_tier(Tier::Avx512)).unwrap();
    assert_eq!(poor.compare(), CompareKind::Emulated { sign_flip: true });
    assert_eq!(rich.compare(), CompareKind::Native);
    assert!(rich.cost() < poor.cost());

    let input = [u64::MAX, 0, 1 << 63, 7];
    assert_eq!(apply_stage(&poor, &input), apply_stage(&rich, &input));
}

#[test]
fn test_blend_prefers_mask_move_when_available() {
    let perm = Permutation::new(BATCHER_6[0].to_vec()).unwrap();
    let rich = compile_stage(&perm, ElementType::U8, &CapabilitySet::for_tier(Tier::Avx512)).unwrap();
    assert_eq!(rich.blend().strategy(), BlendStrategy::MaskMove);

    let poor = compile_stage(&perm, ElementType::U8, &CapabilitySet::for_tier(Tier::Sse4)).unwrap();
    assert_eq!(poor.blend().strategy(), BlendStrategy::ByteVariable);
}

#[test]
fn test_display_lists_every_step() {
    let perm = Permutation::new(BITONIC_8[0].to_vec()).unwrap();
    let plan = compile_stage(&perm, ElementType::U32, &CapabilitySet::for_tier(Tier::Avx2)).unwrap();
    let listing = plan.to_string();
    assert!(listing.starts_with("; u32 x8 in ymm"));
    assert!(listing.contains("pshufd 0xb1"));
    assert!(listing.contains("pminud"));
    assert!(listing.contains("pmaxud"));
    assert!(listing.contains("vpblendd 0x55"));
}

#[test]
fn test_network_matches_sequential() {
    let network = bitonic_network(24);
    let config = CompilerConfig::for_tier(Tier::Avx512).with_threads(4);
    let parallel = compile_network(&network, ElementType::I16, &config).unwrap();
    let sequential = compile_network_sequential(&network, ElementType::I16, &config).unwrap();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel.stages().len(), network.depth());
    assert_eq!(parallel.size(), 24);
    assert!(parallel.cost() > 0);
}

#[test]
fn test_network_compiler_reuses_its_pool() {
    let compiler = NetworkCompiler::new(CompilerConfig::for_tier(Tier::Avx512).with_threads(3));
    assert_eq!(compiler.threads(), 3);
    for size in [8, 13, 24, 64] {
        let network = bitonic_network(size);
        let pooled = compiler.compile(&network, ElementType::U8).unwrap();
        let sequential = compile_network_sequential(&network, ElementType::U8, compiler.config()).unwrap();
        assert_eq!(pooled, sequential);
    }
    assert_eq!(compiler.threads(), 3);
}

#[test]
fn test_network_reports_first_failing_stage() {
    // 24 u16 lanes need zmm, which the minimum tier lacks
    let network = bitonic_network(24);
    let config = CompilerConfig::for_tier(Tier::Sse4);
    let err = compile_network(&network, ElementType::U16, &config).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnsupportedTarget {
            primitive: "zmm",
            ..
        }
    ));
}

#[test]
fn test_promotion_can_be_disabled() {
    let network = fixture(&BITONIC_16);
    let config = CompilerConfig::for_tier(Tier::Sse4);
    let promoted = compile_network(&network, ElementType::U8, &config).unwrap();
    let plain = compile_network(&network, ElementType::U8, &config.clone().without_promotion()).unwrap();
    assert!(promoted.promoted_stages() > 0);
    assert_eq!(plain.promoted_stages(), 0);
    assert!(promoted.cost() < plain.cost());
}

#[test]
fn test_compile_stage_with_uses_config_capabilities() {
    let perm = Permutation::new(BITONIC_8[2].to_vec()).unwrap();
    let config = CompilerConfig::with_capabilities(CapabilitySet::for_tier(Tier::Sse4));
    let plan = compile_stage_with(&perm, ElementType::U8, &config).unwrap();
    assert!(plan.tier() <= Tier::Sse4);
}
