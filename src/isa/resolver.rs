//! Capability resolver
//!
//! Maps a register width, element type and [`CapabilitySet`] onto the
//! concrete lowerings allowed for the four primitive families of a
//! compare-exchange stage: lane-local shuffle, cross-lane permute, masked
//! blend and min/max compare.
//!
//! Each family is described by a static table listing every lowering the
//! instruction set offers for the register and width, best first, together
//! with the features it needs. Resolution filters the table by what the
//! capabilities allow. Raising the tier only ever adds table rows, so
//! lowerings are monotonic in tier.

use crate::error::CompileError;
use crate::isa::capability::CapabilitySet;
use crate::isa::features::{Feature, FeatureSet};
use crate::network::{ElementType, ElementWidth, RegisterWidth, Signedness};

use Feature::*;

/// How the permute step moves data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermuteStrategy {
    /// `pshufd` immediate, same dword pattern in every lane group
    DwordImmediate,
    /// `pshuflw` + `pshufhw` immediates, words stay in their 64-bit half
    WordImmediate,
    /// `pshufb` byte table inside each lane group
    ByteTable,
    /// `vpermq` immediate across lane groups
    QwordImmediate,
    /// `vperm{b,w,d,q}` driven by an index vector
    Indexed,
    /// Rotated lane groups, zeroing `pshufb` per rotation, OR of the parts
    MaskedUnion,
}

impl PermuteStrategy {
    /// True for strategies that move data between lane groups
    pub fn crosses_groups(self) -> bool {
        matches!(
            self,
            PermuteStrategy::QwordImmediate | PermuteStrategy::Indexed | PermuteStrategy::MaskedUnion
        )
    }
}

/// A permute lowering for one unit width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermutePrimitive {
    pub strategy: PermuteStrategy,
    pub unit: ElementWidth,
    pub requires: FeatureSet,
}

impl PermutePrimitive {
    /// True when the primitive realizes every permutation of its unit width
    pub fn is_complete(&self, register: RegisterWidth) -> bool {
        let single_group = register.lane_groups() == 1;
        match self.strategy {
            PermuteStrategy::DwordImmediate | PermuteStrategy::ByteTable => single_group,
            PermuteStrategy::WordImmediate => false,
            PermuteStrategy::QwordImmediate => register == RegisterWidth::Ymm,
            PermuteStrategy::Indexed | PermuteStrategy::MaskedUnion => true,
        }
    }
}

/// How min and max are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareKind {
    /// A native `pmin`/`pmax` for the width and signedness
    Native,
    /// Greater-than compare followed by a byte-granular select
    ///
    /// Unsigned operands are biased by XOR with the sign bit first.
    Emulated { sign_flip: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompareLowering {
    pub kind: CompareKind,
    pub requires: FeatureSet,
}

/// How the min and max vectors are recombined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendStrategy {
    /// Opmask-driven `vmovdqu{8,16,32,64}`
    MaskMove,
    /// `pblendw` immediate
    WordImmediate,
    /// `vpblendd` immediate
    DwordImmediate,
    /// `pblendvb` with a byte selector vector
    ByteVariable,
}

/// Bit granularity a selector mask is built at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskGranularity {
    /// One bit per element lane
    Lane,
    /// One bit per byte, replicated across each lane's bytes
    Byte,
    /// Two bits per lane, for wide lanes blended at half their width
    Pair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendPrimitive {
    pub strategy: BlendStrategy,
    pub granularity: MaskGranularity,
    pub requires: FeatureSet,
}

impl BlendPrimitive {
    /// True when the primitive realizes every selector of the register
    ///
    /// A `pblendw` immediate over word lanes covers one lane group, so
    /// wider registers need the same pattern in every group.
    pub fn is_complete(&self, register: RegisterWidth) -> bool {
        !(self.strategy == BlendStrategy::WordImmediate
            && self.granularity == MaskGranularity::Lane
            && register.lane_groups() > 1)
    }
}

/// Resolved lowerings for one register, element type and capability set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lowering {
    pub register: RegisterWidth,
    pub element: ElementType,
    /// Usable permute primitives at the native width, in candidate order
    pub permute: Vec<PermutePrimitive>,
    pub compare: CompareLowering,
    /// Usable blend primitives, best first
    pub blend: Vec<BlendPrimitive>,
}

impl Lowering {
    /// Lane-local shuffle primitives
    pub fn lane_local(&self) -> impl Iterator<Item = &PermutePrimitive> {
        self.permute.iter().filter(|p| !p.strategy.crosses_groups())
    }

    /// Cross-lane permute primitives
    pub fn cross_lane(&self) -> impl Iterator<Item = &PermutePrimitive> {
        self.permute.iter().filter(|p| p.strategy.crosses_groups())
    }

    /// The blend that will be tried first
    pub fn richest_blend(&self) -> Option<&BlendPrimitive> {
        self.blend.first()
    }
}

fn by_register(register: RegisterWidth, xmm: &[Feature], ymm: &[Feature], zmm: &[Feature]) -> FeatureSet {
    match register {
        RegisterWidth::Xmm => FeatureSet::of(xmm),
        RegisterWidth::Ymm => FeatureSet::of(ymm),
        RegisterWidth::Zmm => FeatureSet::of(zmm),
    }
}

/// Features needed to hold data in the register at all
pub fn register_features(register: RegisterWidth) -> FeatureSet {
    by_register(register, &[Sse2], &[Avx], &[Avx512F])
}

/// Every permute lowering for `unit`-wide lanes, in candidate order
pub fn permute_table(register: RegisterWidth, unit: ElementWidth) -> Vec<PermutePrimitive> {
    let mut table = Vec::new();
    let mut push = |strategy, requires| {
        table.push(PermutePrimitive {
            strategy,
            unit,
            requires,
        })
    };

    if unit >= ElementWidth::B4 {
        push(
            PermuteStrategy::DwordImmediate,
            by_register(register, &[Sse2], &[Avx2], &[Avx512F]),
        );
    }
    if unit == ElementWidth::B2 {
        push(
            PermuteStrategy::WordImmediate,
            by_register(register, &[Sse2], &[Avx2], &[Avx512Bw]),
        );
    }
    push(
        PermuteStrategy::ByteTable,
        by_register(register, &[Ssse3], &[Avx2], &[Avx512Bw]),
    );

    if register.lane_groups() > 1 {
        if unit == ElementWidth::B8 {
            push(
                PermuteStrategy::QwordImmediate,
                by_register(register, &[], &[Avx2], &[Avx512F]),
            );
        }
        let indexed = match unit {
            ElementWidth::B8 => by_register(register, &[], &[Avx512F, Avx512Vl], &[Avx512F]),
            ElementWidth::B4 => by_register(register, &[], &[Avx2], &[Avx512F]),
            ElementWidth::B2 => by_register(register, &[], &[Avx512Bw, Avx512Vl], &[Avx512Bw]),
            ElementWidth::B1 => by_register(register, &[], &[Avx512Vbmi, Avx512Vl], &[Avx512Vbmi]),
        };
        push(PermuteStrategy::Indexed, indexed);
        push(
            PermuteStrategy::MaskedUnion,
            by_register(register, &[], &[Avx2], &[Avx512F, Avx512Bw]),
        );
    }
    table
}

/// Every min/max lowering for the element type, best first
pub fn compare_table(register: RegisterWidth, element: ElementType) -> Vec<CompareLowering> {
    let native = |requires: FeatureSet| CompareLowering {
        kind: CompareKind::Native,
        requires,
    };
    let unsigned = element.signedness == Signedness::Unsigned;

    match (register, element.width) {
        (RegisterWidth::Xmm, ElementWidth::B1) => {
            vec![native(FeatureSet::of(if unsigned { &[Sse2] } else { &[Sse41] }))]
        }
        (RegisterWidth::Xmm, ElementWidth::B2) => {
            vec![native(FeatureSet::of(if unsigned { &[Sse41] } else { &[Sse2] }))]
        }
        (RegisterWidth::Xmm, ElementWidth::B4) => vec![native(FeatureSet::of(&[Sse41]))],
        (RegisterWidth::Ymm, ElementWidth::B1 | ElementWidth::B2 | ElementWidth::B4) => {
            vec![native(FeatureSet::of(&[Avx2]))]
        }
        (RegisterWidth::Xmm | RegisterWidth::Ymm, ElementWidth::B8) => {
            let mut emulated = by_register(register, &[Sse41, Sse42], &[Avx2], &[]);
            if unsigned && register == RegisterWidth::Xmm {
                emulated = emulated.with(Sse2);
            }
            vec![
                native(FeatureSet::of(&[Avx512F, Avx512Vl])),
                CompareLowering {
                    kind: CompareKind::Emulated {
                        sign_flip: unsigned,
                    },
                    requires: emulated,
                },
            ]
        }
        (RegisterWidth::Zmm, ElementWidth::B1 | ElementWidth::B2) => {
            vec![native(FeatureSet::of(&[Avx512Bw]))]
        }
        (RegisterWidth::Zmm, ElementWidth::B4 | ElementWidth::B8) => {
            vec![native(FeatureSet::of(&[Avx512F]))]
        }
    }
}

/// Every blend lowering for `width`-wide lanes, best first
pub fn blend_table(register: RegisterWidth, width: ElementWidth) -> Vec<BlendPrimitive> {
    let blend = |strategy, granularity, requires| BlendPrimitive {
        strategy,
        granularity,
        requires,
    };
    let byte_mask_move = by_register(register, &[Avx512Bw, Avx512Vl], &[Avx512Bw, Avx512Vl], &[Avx512Bw]);
    let wide_mask_move = by_register(register, &[Avx512F, Avx512Vl], &[Avx512F, Avx512Vl], &[Avx512F]);
    let variable = |table: &mut Vec<BlendPrimitive>| {
        if register != RegisterWidth::Zmm {
            table.push(blend(
                BlendStrategy::ByteVariable,
                MaskGranularity::Byte,
                by_register(register, &[Sse41], &[Avx2], &[]),
            ));
        }
    };
    let mut table = Vec::new();

    match width {
        ElementWidth::B1 => {
            table.push(blend(BlendStrategy::MaskMove, MaskGranularity::Lane, byte_mask_move));
            variable(&mut table);
        }
        ElementWidth::B2 => {
            if register != RegisterWidth::Zmm {
                table.push(blend(
                    BlendStrategy::WordImmediate,
                    MaskGranularity::Lane,
                    by_register(register, &[Sse41], &[Avx2], &[]),
                ));
            }
            table.push(blend(BlendStrategy::MaskMove, MaskGranularity::Lane, byte_mask_move));
            variable(&mut table);
        }
        ElementWidth::B4 => {
            if register != RegisterWidth::Zmm {
                table.push(blend(
                    BlendStrategy::DwordImmediate,
                    MaskGranularity::Lane,
                    FeatureSet::of(&[Avx2]),
                ));
            }
            if register == RegisterWidth::Xmm {
                table.push(blend(
                    BlendStrategy::WordImmediate,
                    MaskGranularity::Pair,
                    FeatureSet::of(&[Sse41]),
                ));
            }
            table.push(blend(BlendStrategy::MaskMove, MaskGranularity::Lane, wide_mask_move));
        }
        ElementWidth::B8 => {
            table.push(blend(BlendStrategy::MaskMove, MaskGranularity::Lane, wide_mask_move));
            if register != RegisterWidth::Zmm {
                table.push(blend(
                    BlendStrategy::DwordImmediate,
                    MaskGranularity::Pair,
                    FeatureSet::of(&[Avx2]),
                ));
            }
            if register == RegisterWidth::Xmm {
                variable(&mut table);
            }
        }
    }
    table
}

/// Usable permute primitives for `unit`-wide lanes
pub fn permute_primitives(
    capabilities: &CapabilitySet,
    register: RegisterWidth,
    unit: ElementWidth,
) -> Vec<PermutePrimitive> {
    permute_table(register, unit)
        .into_iter()
        .filter(|p| capabilities.supports(p.requires))
        .collect()
}

/// Features missing for the closest complete row of a table
fn closest_missing(capabilities: &CapabilitySet, rows: impl Iterator<Item = FeatureSet>) -> FeatureSet {
    rows.map(|requires| requires.missing_from(capabilities.usable()))
        .min_by_key(|missing| missing.len())
        .unwrap_or_default()
}

/// Resolves the lowering of every primitive family
///
/// Fails with `UnsupportedTarget` when any family has no lowering that
/// covers every permutation or selector of the register. A successful
/// resolution guarantees the native width can always be compiled.
pub fn resolve(
    capabilities: &CapabilitySet,
    register: RegisterWidth,
    element: ElementType,
) -> Result<Lowering, CompileError> {
    let needed = register_features(register);
    if !capabilities.supports(needed) {
        return Err(CompileError::unsupported(
            register.name(),
            needed.missing_from(capabilities.usable()),
        ));
    }

    let compares = compare_table(register, element);
    let compare = compares
        .iter()
        .find(|c| capabilities.supports(c.requires))
        .copied()
        .ok_or_else(|| {
            CompileError::unsupported(
                "min/max compare",
                closest_missing(capabilities, compares.iter().map(|c| c.requires)),
            )
        })?;

    let blends = blend_table(register, element.width);
    let blend: Vec<BlendPrimitive> = blends
        .iter()
        .filter(|b| capabilities.supports(b.requires))
        .copied()
        .collect();
    if !blend.iter().any(|b| b.is_complete(register)) {
        return Err(CompileError::unsupported(
            "masked blend",
            closest_missing(
                capabilities,
                blends.iter().filter(|b| b.is_complete(register)).map(|b| b.requires),
            ),
        ));
    }

    let permute = permute_primitives(capabilities, register, element.width);
    if !permute.iter().any(|p| p.is_complete(register)) {
        let primitive = if register.lane_groups() > 1 {
            "cross-lane permute"
        } else {
            "lane-local shuffle"
        };
        return Err(CompileError::unsupported(
            primitive,
            closest_missing(
                capabilities,
                permute_table(register, element.width)
                    .into_iter()
                    .filter(|p| p.is_complete(register))
                    .map(|p| p.requires),
            ),
        ));
    }

    Ok(Lowering {
        register,
        element,
        permute,
        compare,
        blend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::features::Tier;

    #[test]
    fn test_emulated_u64_compare_below_avx512() {
        let caps = CapabilitySet::for_tier(Tier::Avx2);
        let lowering = resolve(&caps, RegisterWidth::Ymm, ElementType::U64).unwrap();
        assert_eq!(lowering.compare.kind, CompareKind::Emulated { sign_flip: true });

        let lowering = resolve(&caps, RegisterWidth::Ymm, ElementType::I64).unwrap();
        assert_eq!(lowering.compare.kind, CompareKind::Emulated { sign_flip: false });

        let caps = CapabilitySet::for_tier(Tier::Avx512);
        let lowering = resolve(&caps, RegisterWidth::Ymm, ElementType::U64).unwrap();
        assert_eq!(lowering.compare.kind, CompareKind::Native);
    }

    #[test]
    fn test_missing_register_is_unsupported() {
        let caps = CapabilitySet::for_tier(Tier::Sse4);
        let err = resolve(&caps, RegisterWidth::Ymm, ElementType::U8).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedTarget {
                primitive: "ymm",
                missing: vec![Avx],
            }
        );
    }

    #[test]
    fn test_byte_blend_prefers_mask_move() {
        let caps = CapabilitySet::for_tier(Tier::Avx512);
        let lowering = resolve(&caps, RegisterWidth::Xmm, ElementType::U8).unwrap();
        assert_eq!(lowering.richest_blend().unwrap().strategy, BlendStrategy::MaskMove);

        let caps = CapabilitySet::for_tier(Tier::Avx2);
        let lowering = resolve(&caps, RegisterWidth::Xmm, ElementType::U8).unwrap();
        let blend = lowering.richest_blend().unwrap();
        assert_eq!(blend.strategy, BlendStrategy::ByteVariable);
        assert_eq!(blend.granularity, MaskGranularity::Byte);
    }

    #[test]
    fn test_shuffle_needs_a_complete_primitive() {
        let caps = CapabilitySet::for_tier(Tier::Sse4).without_feature(Ssse3);
        let err = resolve(&caps, RegisterWidth::Xmm, ElementType::U8).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedTarget {
                primitive: "lane-local shuffle",
                missing: vec![Ssse3],
            }
        );

        // Dword lanes still shuffle with pshufd.
        assert!(resolve(&caps, RegisterWidth::Xmm, ElementType::U32).is_ok());
    }

    #[test]
    fn test_avx_without_avx2_has_no_integer_compare() {
        let caps = CapabilitySet::for_tier(Tier::Avx2).without_feature(Avx2);
        let err = resolve(&caps, RegisterWidth::Ymm, ElementType::U8).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnsupportedTarget {
                primitive: "min/max compare",
                ..
            }
        ));
    }

    #[test]
    fn test_tables_grow_with_tier() {
        for register in RegisterWidth::ALL {
            for width in ElementWidth::ALL {
                let poor = permute_primitives(&CapabilitySet::for_tier(Tier::Avx2), register, width);
                let rich = permute_primitives(&CapabilitySet::for_tier(Tier::Avx512), register, width);
                assert!(poor.iter().all(|p| rich.contains(p)));
            }
        }
    }

    #[test]
    fn test_vbmi_gives_byte_index_permute() {
        let caps = CapabilitySet::for_tier(Tier::Avx512);
        let lowering = resolve(&caps, RegisterWidth::Zmm, ElementType::U8).unwrap();
        assert!(lowering
            .cross_lane()
            .any(|p| p.strategy == PermuteStrategy::Indexed));

        let caps = caps.without_feature(Avx512Vbmi);
        let lowering = resolve(&caps, RegisterWidth::Zmm, ElementType::U8).unwrap();
        let cross: Vec<_> = lowering.cross_lane().map(|p| p.strategy).collect();
        assert_eq!(cross, vec![PermuteStrategy::MaskedUnion]);
    }
}
