//! Instruction plans
//!
//! A plan is the compiled form of one compare-exchange stage: four steps
//! that permute the input, take the elementwise min and max of input and
//! permuted copy, and blend the two by the selector mask.

use std::fmt;

use crate::constants::{CONSTANT_LOAD_COST, INSTRUCTION_COST};
use crate::isa::{CompareKind, FeatureSet, Tier};
use crate::network::{ElementType, ElementWidth, RegisterWidth, Signedness};
use crate::selector::{BlendOp, PermuteOp, SelectorMask};

/// One abstract operation of a plan
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Bring every lane's partner into the same lane of a second register
    Permute(PermuteOp),
    /// Elementwise minimum of input and permuted copy
    Min(CompareKind),
    /// Elementwise maximum of input and permuted copy
    Max(CompareKind),
    /// Pick min lanes from the min vector and the rest from the max vector
    Blend { op: BlendOp, selector: SelectorMask },
}

impl Operation {
    pub fn cost(&self) -> u32 {
        match self {
            Operation::Permute(op) => op.cost(),
            Operation::Min(kind) | Operation::Max(kind) => compare_cost(*kind),
            Operation::Blend { op, .. } => op.cost(),
        }
    }
}

fn compare_cost(kind: CompareKind) -> u32 {
    match kind {
        CompareKind::Native => INSTRUCTION_COST,
        // pcmpgtq + pblendvb
        CompareKind::Emulated { sign_flip: false } => 2 * INSTRUCTION_COST,
        // bias constant, two XORs, pcmpgtq + pblendvb
        CompareKind::Emulated { sign_flip: true } => CONSTANT_LOAD_COST + 4 * INSTRUCTION_COST,
    }
}

/// An operation with the features it needs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub operation: Operation,
    pub requires: FeatureSet,
    /// Lowest tier that provides `requires`
    pub tier: Tier,
}

impl Step {
    pub fn new(operation: Operation, requires: FeatureSet) -> Self {
        Step {
            operation,
            requires,
            tier: requires.minimum_tier(),
        }
    }
}

/// Compiled compare-exchange stage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstructionPlan {
    register: RegisterWidth,
    element: ElementType,
    permute_unit: ElementWidth,
    steps: Vec<Step>,
}

impl InstructionPlan {
    /// Assembles the four steps of a stage
    ///
    /// Min and max share one compare lowering and its features.
    pub(crate) fn new(
        register: RegisterWidth,
        element: ElementType,
        permute_unit: ElementWidth,
        permute: (PermuteOp, FeatureSet),
        compare: (CompareKind, FeatureSet),
        blend: (BlendOp, SelectorMask, FeatureSet),
    ) -> Self {
        let (permute_op, permute_requires) = permute;
        let (kind, compare_requires) = compare;
        let (blend_op, selector, blend_requires) = blend;
        InstructionPlan {
            register,
            element,
            permute_unit,
            steps: vec![
                Step::new(Operation::Permute(permute_op), permute_requires),
                Step::new(Operation::Min(kind), compare_requires),
                Step::new(Operation::Max(kind), compare_requires),
                Step::new(
                    Operation::Blend {
                        op: blend_op,
                        selector,
                    },
                    blend_requires,
                ),
            ],
        }
    }

    pub fn register(&self) -> RegisterWidth {
        self.register
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    /// Lane width the permute step was encoded at
    ///
    /// Wider than the element width when the stage was promoted.
    pub fn permute_unit(&self) -> ElementWidth {
        self.permute_unit
    }

    pub fn is_promoted(&self) -> bool {
        self.permute_unit != self.element.width
    }

    /// Number of element lanes in the register
    pub fn lanes(&self) -> usize {
        self.register.lanes(self.element.width)
    }

    /// Permute, Min, Max and Blend, in execution order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn permute(&self) -> &PermuteOp {
        match &self.steps[0].operation {
            Operation::Permute(op) => op,
            _ => unreachable!("plans always start with a permute"),
        }
    }

    pub fn compare(&self) -> CompareKind {
        match self.steps[1].operation {
            Operation::Min(kind) => kind,
            _ => unreachable!("the second step of a plan is always min"),
        }
    }

    pub fn blend(&self) -> &BlendOp {
        match &self.steps[3].operation {
            Operation::Blend { op, .. } => op,
            _ => unreachable!("plans always end with a blend"),
        }
    }

    pub fn selector(&self) -> &SelectorMask {
        match &self.steps[3].operation {
            Operation::Blend { selector, .. } => selector,
            _ => unreachable!("plans always end with a blend"),
        }
    }

    /// Estimated instruction count of the stage
    pub fn cost(&self) -> u32 {
        self.steps.iter().map(|step| step.operation.cost()).sum()
    }

    /// Union of the features every step needs
    pub fn required_features(&self) -> FeatureSet {
        self.steps
            .iter()
            .fold(FeatureSet::empty(), |set, step| set.union(step.requires))
    }

    /// Lowest tier that runs the whole plan
    pub fn tier(&self) -> Tier {
        self.required_features().minimum_tier()
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn width_suffix(width: ElementWidth) -> &'static str {
    match width {
        ElementWidth::B1 => "b",
        ElementWidth::B2 => "w",
        ElementWidth::B4 => "d",
        ElementWidth::B8 => "q",
    }
}

fn compare_mnemonic(min: bool, element: ElementType, kind: CompareKind) -> String {
    match kind {
        CompareKind::Native => {
            let sign = if element.signedness == Signedness::Signed { 's' } else { 'u' };
            let name = if min { "min" } else { "max" };
            format!("p{}{}{}", name, sign, width_suffix(element.width))
        }
        CompareKind::Emulated { sign_flip } => format!(
            "{}pcmpgtq + pblendvb ({})",
            if sign_flip { "pxor bias + " } else { "" },
            if min { "min" } else { "max" }
        ),
    }
}

impl fmt::Display for InstructionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "; {} x{} in {} (tier {}, cost {})",
            self.element,
            self.lanes(),
            self.register.name(),
            self.tier(),
            self.cost()
        )?;
        for step in &self.steps {
            match &step.operation {
                Operation::Permute(op) => match op {
                    PermuteOp::ShuffleDwords { imm } => writeln!(f, "pshufd 0x{:02x}", imm)?,
                    PermuteOp::ShuffleWords { lo, hi } => {
                        writeln!(f, "pshuflw 0x{:02x}; pshufhw 0x{:02x}", lo, hi)?
                    }
                    PermuteOp::ShuffleBytes { control } => {
                        writeln!(f, "pshufb [{}]", hex_bytes(control))?
                    }
                    PermuteOp::PermuteQwords { imm } => writeln!(f, "vpermq 0x{:02x}", imm)?,
                    PermuteOp::PermuteIndexed { unit, indices } => {
                        writeln!(f, "vperm{} [{}]", width_suffix(*unit), hex_bytes(indices))?
                    }
                    PermuteOp::MaskedUnion { parts } => {
                        for part in parts {
                            if let Some(imm) = part.rotation_immediate(self.register) {
                                write!(f, "rotate 0x{:02x}; ", imm)?;
                            }
                            writeln!(f, "pshufb [{}]", hex_bytes(&part.control))?;
                        }
                        writeln!(f, "por x{}", parts.len().saturating_sub(1))?
                    }
                },
                Operation::Min(kind) => writeln!(f, "{}", compare_mnemonic(true, self.element, *kind))?,
                Operation::Max(kind) => writeln!(f, "{}", compare_mnemonic(false, self.element, *kind))?,
                Operation::Blend { op, .. } => match op {
                    BlendOp::MaskMove { unit, mask } => {
                        writeln!(f, "kmov 0x{:x}; vmovdqu{}", mask, unit.bytes() * 8)?
                    }
                    BlendOp::WordImmediate(imm) => writeln!(f, "pblendw 0x{:02x}", imm)?,
                    BlendOp::DwordImmediate(imm) => writeln!(f, "vpblendd 0x{:02x}", imm)?,
                    BlendOp::ByteVariable(selector) => {
                        writeln!(f, "pblendvb [{}]", hex_bytes(selector))?
                    }
                },
            }
        }
        Ok(())
    }
}
