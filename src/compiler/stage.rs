//! Compare-exchange stage compiler
//!
//! Orchestrates the pipeline for one stage:
//!
//! 1. validate the permutation and pick the smallest register that holds it
//! 2. resolve primitive lowerings for the register and element type
//! 3. pad to the register's lane count with self-mapped lanes
//! 4. collect permute candidates at the native width and every promoted width
//! 5. build the selector mask and blend literal for the richest blend
//!
//! The result depends only on its inputs, never on data or global state.

use crate::config::CompilerConfig;
use crate::constants::{MAX_REGISTER_BYTES, MIN_REGISTER_BYTES};
use crate::error::CompileError;
use crate::isa::resolver::permute_primitives;
use crate::isa::{resolve, CapabilitySet, FeatureSet, Lowering};
use crate::network::{ElementType, ElementWidth, Permutation, RegisterWidth};
use crate::promotion::promotions;
use crate::selector::{blend_op, build_permute, BlendOp, ByteRoute, PermuteOp, SelectorMask};

use super::plan::InstructionPlan;

/// A permute encoding considered for a stage
#[derive(Debug, Clone)]
struct PermuteChoice {
    op: PermuteOp,
    unit: ElementWidth,
    requires: FeatureSet,
}

/// Compiles one stage with width promotion enabled
///
/// # Examples
///
/// ```
/// use lanesort::{compile_stage, CapabilitySet, ElementType, Permutation, Tier};
///
/// let perm = Permutation::new(vec![1, 0, 3, 2, 5, 4]).unwrap();
/// let caps = CapabilitySet::for_tier(Tier::Sse4);
/// let plan = compile_stage(&perm, ElementType::U8, &caps).unwrap();
/// assert_eq!(plan.selector().lane_bits(plan.element().width), 0x3);
/// ```
pub fn compile_stage(
    perm: &Permutation,
    element: ElementType,
    capabilities: &CapabilitySet,
) -> Result<InstructionPlan, CompileError> {
    compile(perm, element, capabilities, true)
}

/// Compiles one stage under a full configuration
pub fn compile_stage_with(
    perm: &Permutation,
    element: ElementType,
    config: &CompilerConfig,
) -> Result<InstructionPlan, CompileError> {
    compile(perm, element, &config.capabilities, config.promotion)
}

/// Smallest register that holds the stage
pub fn register_for(perm: &Permutation, element: ElementType) -> Result<RegisterWidth, CompileError> {
    let bytes = perm.lanes() * element.bytes();
    RegisterWidth::fitting(bytes.max(MIN_REGISTER_BYTES)).ok_or_else(|| {
        CompileError::InvalidPermutation(format!(
            "{} lanes of {} need {} bytes, more than the {}-byte limit",
            perm.lanes(),
            element,
            bytes,
            MAX_REGISTER_BYTES
        ))
    })
}

fn compile(
    perm: &Permutation,
    element: ElementType,
    capabilities: &CapabilitySet,
    promotion: bool,
) -> Result<InstructionPlan, CompileError> {
    let register = register_for(perm, element)?;
    let lowering = resolve(capabilities, register, element)?;
    let padded = perm.padded_to(register.lanes(element.width))?;

    let mut candidates = vec![(element.width, padded.clone())];
    if promotion {
        candidates.extend(
            promotions(&padded, element.width)
                .into_iter()
                .map(|p| (p.width, p.permutation)),
        );
    }

    let permute = select_permute(&candidates, capabilities, register)?;
    let (blend, selector, blend_requires) = select_blend(&lowering, &padded)?;

    log::debug!(
        "{} x{} in {}: permute {:?} at {} bytes, compare {:?}, blend {:?}",
        element,
        perm.logical_size(),
        register.name(),
        permute.op.strategy(),
        permute.unit.bytes(),
        lowering.compare.kind,
        blend.strategy()
    );

    Ok(InstructionPlan::new(
        register,
        element,
        permute.unit,
        (permute.op, permute.requires),
        (lowering.compare.kind, lowering.compare.requires),
        (blend, selector, blend_requires),
    ))
}

/// Cheapest permute encoding over every candidate width
///
/// Wider widths are visited first and only replaced by a strictly cheaper
/// encoding, so ties go to the coarser width. Within one width the
/// candidate order of the resolver breaks ties.
fn select_permute(
    candidates: &[(ElementWidth, Permutation)],
    capabilities: &CapabilitySet,
    register: RegisterWidth,
) -> Result<PermuteChoice, CompileError> {
    let mut best: Option<PermuteChoice> = None;

    for (unit, perm) in candidates.iter().rev() {
        let route = ByteRoute::from_permutation(perm, *unit);
        for primitive in permute_primitives(capabilities, register, *unit) {
            let Some(op) = build_permute(&primitive, &route, register) else {
                log::trace!(
                    "{:?} at {} bytes cannot express the route",
                    primitive.strategy,
                    unit.bytes()
                );
                continue;
            };
            let cheaper = best.as_ref().map_or(true, |b| op.cost() < b.op.cost());
            if cheaper {
                best = Some(PermuteChoice {
                    op,
                    unit: *unit,
                    requires: primitive.requires,
                });
            }
        }
    }

    best.ok_or_else(|| {
        CompileError::NotRepresentable(format!(
            "no permute primitive in {} encodes the stage",
            register.name()
        ))
    })
}

/// First usable blend that can express the selector
fn select_blend(
    lowering: &Lowering,
    padded: &Permutation,
) -> Result<(BlendOp, SelectorMask, FeatureSet), CompileError> {
    let width = lowering.element.width;
    lowering
        .blend
        .iter()
        .find_map(|primitive| {
            let selector = SelectorMask::build(padded, width, primitive.granularity);
            match blend_op(primitive, &selector, width) {
                Some(op) => Some((op, selector, primitive.requires)),
                None => {
                    log::trace!("{:?} blend rejected selector {:?}", primitive.strategy, selector);
                    None
                }
            }
        })
        .ok_or_else(|| {
            CompileError::NotRepresentable(format!(
                "no blend primitive in {} encodes the selector",
                lowering.register.name()
            ))
        })
}
