//! Bit-exact models of the instructions plans are built from

use crate::compiler::InstructionPlan;
use crate::constants::{BLENDV_SELECT_BYTE, LANE_GROUP_BYTES, SHUFFLE_ZERO_BYTE};
use crate::isa::CompareKind;
use crate::network::{ElementType, ElementWidth, RegisterWidth, Signedness};
use crate::selector::{BlendOp, PermuteOp, UnionPart};

use super::register::Register;

fn same_shape(reg: &Register) -> Register {
    Register::zeroed(reg.width())
}

/// `pshufb`: per lane group byte table lookup, high bit zeroes
pub fn pshufb(src: &Register, control: &[u8]) -> Register {
    let mut out = same_shape(src);
    let input = src.as_bytes();
    for (dst, (slot, &c)) in out.as_bytes_mut().iter_mut().zip(control.iter().enumerate()) {
        *dst = if c & SHUFFLE_ZERO_BYTE != 0 {
            0
        } else {
            let base = slot / LANE_GROUP_BYTES * LANE_GROUP_BYTES;
            input[base + (c & 0x0f) as usize]
        };
    }
    out
}

/// Moves `unit`-wide lanes: destination lane `j` takes source lane `select(j)`
fn move_units(src: &Register, unit: ElementWidth, select: impl Fn(usize) -> usize) -> Register {
    let mut out = same_shape(src);
    for j in 0..src.lanes(unit) {
        out.set_lane(unit, j, src.lane(unit, select(j)));
    }
    out
}

fn selector(imm: u8, slot: usize) -> usize {
    ((imm >> (2 * slot)) & 0b11) as usize
}

/// `pshufd`: the same dword selection in every lane group
pub fn pshufd(src: &Register, imm: u8) -> Register {
    move_units(src, ElementWidth::B4, |j| j / 4 * 4 + selector(imm, j % 4))
}

/// `pshuflw`: low four words of each lane group, high words kept
pub fn pshuflw(src: &Register, imm: u8) -> Register {
    move_units(src, ElementWidth::B2, |j| {
        let base = j / 8 * 8;
        if j % 8 < 4 {
            base + selector(imm, j % 8)
        } else {
            j
        }
    })
}

/// `pshufhw`: high four words of each lane group, low words kept
pub fn pshufhw(src: &Register, imm: u8) -> Register {
    move_units(src, ElementWidth::B2, |j| {
        let base = j / 8 * 8;
        if j % 8 >= 4 {
            base + 4 + selector(imm, j % 8 - 4)
        } else {
            j
        }
    })
}

/// `vpermq` immediate, applied to each 256-bit half
pub fn vpermq(src: &Register, imm: u8) -> Register {
    move_units(src, ElementWidth::B8, |j| j / 4 * 4 + selector(imm, j % 4))
}

/// `vshufi64x2` with the same register in both operands
pub fn vshufi64x2(src: &Register, imm: u8) -> Register {
    let mut out = same_shape(src);
    let input = src.as_bytes();
    for (group, chunk) in out.as_bytes_mut().chunks_mut(LANE_GROUP_BYTES).enumerate() {
        let from = selector(imm, group) * LANE_GROUP_BYTES;
        chunk.copy_from_slice(&input[from..from + LANE_GROUP_BYTES]);
    }
    out
}

/// `vperm{b,w,d,q}`: index-driven lane selection over the whole register
pub fn vperm_indexed(src: &Register, unit: ElementWidth, indices: &[u8]) -> Register {
    let lanes = src.lanes(unit);
    move_units(src, unit, |j| indices[j] as usize % lanes)
}

pub fn por(a: &Register, b: &Register) -> Register {
    let mut out = a.clone();
    for (dst, &x) in out.as_bytes_mut().iter_mut().zip(b.as_bytes()) {
        *dst |= x;
    }
    out
}

fn rotate_groups(src: &Register, part: &UnionPart) -> Register {
    match (src.width(), part.rotation_immediate(src.width())) {
        (RegisterWidth::Ymm, Some(imm)) => vpermq(src, imm),
        (RegisterWidth::Zmm, Some(imm)) => vshufi64x2(src, imm),
        _ => src.clone(),
    }
}

/// Runs the permute step
pub fn permute(op: &PermuteOp, src: &Register) -> Register {
    match op {
        PermuteOp::ShuffleDwords { imm } => pshufd(src, *imm),
        PermuteOp::ShuffleWords { lo, hi } => pshufhw(&pshuflw(src, *lo), *hi),
        PermuteOp::ShuffleBytes { control } => pshufb(src, control),
        PermuteOp::PermuteQwords { imm } => vpermq(src, *imm),
        PermuteOp::PermuteIndexed { unit, indices } => vperm_indexed(src, *unit, indices),
        PermuteOp::MaskedUnion { parts } => parts
            .iter()
            .map(|part| pshufb(&rotate_groups(src, part), &part.control))
            .fold(same_shape(src), |acc, partial| por(&acc, &partial)),
    }
}

fn sign_extend(value: u64, width: ElementWidth) -> i64 {
    let shift = 64 - 8 * width.bytes() as u32;
    ((value << shift) as i64) >> shift
}

/// `pblendvb`: bytes whose selector has the high bit set come from `b`
pub fn pblendvb(a: &Register, b: &Register, selector: &[u8]) -> Register {
    let mut out = a.clone();
    for ((dst, &x), &s) in out.as_bytes_mut().iter_mut().zip(b.as_bytes()).zip(selector) {
        if s & BLENDV_SELECT_BYTE != 0 {
            *dst = x;
        }
    }
    out
}

/// `pcmpgtq`: all-ones qword where `a > b` as signed integers
pub fn pcmpgtq(a: &Register, b: &Register) -> Register {
    let mut out = same_shape(a);
    for j in 0..a.lanes(ElementWidth::B8) {
        let gt = (a.lane(ElementWidth::B8, j) as i64) > (b.lane(ElementWidth::B8, j) as i64);
        out.set_lane(ElementWidth::B8, j, if gt { u64::MAX } else { 0 });
    }
    out
}

fn xor_lanes(src: &Register, unit: ElementWidth, mask: u64) -> Register {
    let mut out = same_shape(src);
    for j in 0..src.lanes(unit) {
        out.set_lane(unit, j, src.lane(unit, j) ^ mask);
    }
    out
}

/// Elementwise min (`min == true`) or max of two registers
pub fn min_max(
    a: &Register,
    b: &Register,
    element: ElementType,
    kind: CompareKind,
    min: bool,
) -> Register {
    match kind {
        CompareKind::Native => {
            let width = element.width;
            let mut out = same_shape(a);
            for j in 0..a.lanes(width) {
                let (x, y) = (a.lane(width, j), b.lane(width, j));
                let x_gt_y = match element.signedness {
                    Signedness::Signed => sign_extend(x, width) > sign_extend(y, width),
                    Signedness::Unsigned => x > y,
                };
                let pick_y = x_gt_y == min;
                out.set_lane(width, j, if pick_y { y } else { x });
            }
            out
        }
        CompareKind::Emulated { sign_flip } => {
            let gt = if sign_flip {
                let bias = ElementWidth::B8.sign_bit();
                let a = xor_lanes(a, ElementWidth::B8, bias);
                let b = xor_lanes(b, ElementWidth::B8, bias);
                pcmpgtq(&a, &b)
            } else {
                pcmpgtq(a, b)
            };
            // min takes b where a > b; max takes a there
            if min {
                pblendvb(a, b, gt.as_bytes())
            } else {
                pblendvb(b, a, gt.as_bytes())
            }
        }
    }
}

fn blend_units(
    max: &Register,
    min: &Register,
    unit: ElementWidth,
    take_min: impl Fn(usize) -> bool,
) -> Register {
    let mut out = max.clone();
    for j in 0..max.lanes(unit) {
        if take_min(j) {
            out.set_lane(unit, j, min.lane(unit, j));
        }
    }
    out
}

/// Runs the blend step
pub fn blend(op: &BlendOp, max: &Register, min: &Register) -> Register {
    match op {
        BlendOp::MaskMove { unit, mask } => {
            blend_units(max, min, *unit, |j| mask & (1u64 << j) != 0)
        }
        BlendOp::WordImmediate(imm) => {
            blend_units(max, min, ElementWidth::B2, |j| imm & (1u8 << (j % 8)) != 0)
        }
        BlendOp::DwordImmediate(imm) => {
            blend_units(max, min, ElementWidth::B4, |j| imm & (1u8 << (j % 8)) != 0)
        }
        BlendOp::ByteVariable(selector) => pblendvb(max, min, selector),
    }
}

/// Executes every step of a plan on one register
pub fn execute(plan: &InstructionPlan, input: &Register) -> Register {
    assert_eq!(input.width(), plan.register(), "Register width must match the plan");
    let permuted = permute(plan.permute(), input);
    let lo = min_max(input, &permuted, plan.element(), plan.compare(), true);
    let hi = min_max(input, &permuted, plan.element(), plan.compare(), false);
    blend(plan.blend(), &hi, &lo)
}
