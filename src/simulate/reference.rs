//! Typed execution of plans and the scalar oracle they must match

use num_traits::{AsPrimitive, PrimInt};

use crate::compiler::{InstructionPlan, NetworkPlan};
use crate::network::{ElementType, ElementWidth, Network, PairSide, Permutation, Signedness};

use super::execute::execute;
use super::register::Register;

/// Integer types that can live in a register lane
pub trait Lane: PrimInt + Send + Sync + 'static {
    /// Two's-complement bits, sign-extended to 64 bits
    fn to_bits(self) -> u64;
    /// Truncates to the lane's own width
    fn from_bits(bits: u64) -> Self;
}

impl<T> Lane for T
where
    T: PrimInt + AsPrimitive<u64> + Send + Sync + 'static,
    u64: AsPrimitive<T>,
{
    fn to_bits(self) -> u64 {
        self.as_()
    }

    fn from_bits(bits: u64) -> Self {
        bits.as_()
    }
}

/// Element type matching a Rust integer type
pub fn element_of<T: Lane>() -> Option<ElementType> {
    let width = ElementWidth::from_bytes(std::mem::size_of::<T>())?;
    let signedness = if T::min_value() < T::zero() {
        Signedness::Signed
    } else {
        Signedness::Unsigned
    };
    Some(ElementType::new(width, signedness))
}

fn check_element<T: Lane>(element: ElementType) {
    assert_eq!(
        element_of::<T>(),
        Some(element),
        "Lane type does not match the plan's element type"
    );
}

/// Loads `values` into the low lanes of a register, filling the rest
pub fn pack<T: Lane>(plan: &InstructionPlan, values: &[T], fill: T) -> Register {
    let width = plan.element().width;
    let mut reg = Register::zeroed(plan.register());
    assert!(values.len() <= reg.lanes(width), "More values than register lanes");
    for lane in 0..reg.lanes(width) {
        let value = values.get(lane).copied().unwrap_or(fill);
        reg.set_lane(width, lane, value.to_bits());
    }
    reg
}

/// Reads the low `count` lanes of a register
pub fn unpack<T: Lane>(reg: &Register, width: ElementWidth, count: usize) -> Vec<T> {
    (0..count).map(|lane| T::from_bits(reg.lane(width, lane))).collect()
}

/// Runs a compiled stage over `values`, padding with `fill`
pub fn apply_stage_padded<T: Lane>(plan: &InstructionPlan, values: &[T], fill: T) -> Vec<T> {
    check_element::<T>(plan.element());
    let out = execute(plan, &pack(plan, values, fill));
    unpack(&out, plan.element().width, values.len())
}

/// Runs a compiled stage over `values`
///
/// Padding lanes hold the type's maximum, the neutral element of an
/// ascending sort.
pub fn apply_stage<T: Lane>(plan: &InstructionPlan, values: &[T]) -> Vec<T> {
    apply_stage_padded(plan, values, T::max_value())
}

/// Runs every stage of a compiled network
pub fn apply_network<T: Lane>(plan: &NetworkPlan, values: &[T]) -> Vec<T> {
    assert_eq!(values.len(), plan.size(), "Input length must match network size");
    plan.stages()
        .iter()
        .fold(values.to_vec(), |current, stage| apply_stage(stage, &current))
}

/// Scalar compare-exchange: the result every compiled stage must produce
///
/// Lane `i` keeps `min(v[i], v[partner(i)])` when it is `Low` and the max
/// otherwise.
pub fn reference_compare_exchange<T: Ord + Copy>(perm: &Permutation, values: &[T]) -> Vec<T> {
    assert_eq!(values.len(), perm.logical_size(), "Input length must match logical size");
    (0..values.len())
        .map(|lane| {
            let own = values[lane];
            let other = values[perm.partner(lane)];
            match perm.pair_side(lane) {
                PairSide::Low => own.min(other),
                PairSide::High => own.max(other),
            }
        })
        .collect()
}

/// Scalar execution of a whole network
pub fn reference_network<T: Ord + Copy>(network: &Network, values: &[T]) -> Vec<T> {
    network
        .stages()
        .iter()
        .fold(values.to_vec(), |current, stage| reference_compare_exchange(stage, &current))
}
