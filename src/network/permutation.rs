//! Compare-exchange permutations
//!
//! A stage is written the way a network generator prints it: as the
//! argument list of an `_mm_set_epi*` constant, highest lane first. Array
//! position `p` therefore describes lane `len - 1 - p`, and each entry names
//! the lane whose value the described lane is compared against.
//!
//! ```
//! use lanesort::{Permutation, PairSide};
//!
//! // Lanes 0 and 1 compare against lanes 4 and 5; lanes 2 and 3 are unpaired.
//! let perm = Permutation::new(vec![1, 0, 3, 2, 5, 4]).unwrap();
//! assert_eq!(perm.partner(0), 4);
//! assert_eq!(perm.pair_side(0), PairSide::Low);
//! assert_eq!(perm.pair_side(4), PairSide::High);
//! ```

use crate::error::CompileError;

/// Which half of a compare-exchange a lane keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairSide {
    /// The lane keeps the minimum of itself and its partner
    Low,
    /// The lane keeps the maximum of itself and its partner
    High,
}

/// Validates a permutation given in generator order
///
/// Every entry must name a lane in `[0, len)`, and the first
/// `logical_size` lanes must map bijectively onto themselves. Entries for
/// lanes at or beyond `logical_size` are padding and only range-checked.
pub fn validate(indices: &[usize], logical_size: usize) -> Result<(), CompileError> {
    let lanes = indices.len();
    if lanes == 0 {
        return Err(CompileError::InvalidPermutation(
            "permutation has no lanes".to_string(),
        ));
    }
    if logical_size == 0 || logical_size > lanes {
        return Err(CompileError::InvalidPermutation(format!(
            "logical size {} is outside 1..={}",
            logical_size, lanes
        )));
    }
    if let Some(position) = indices.iter().position(|&i| i >= lanes) {
        return Err(CompileError::InvalidPermutation(format!(
            "index {} at position {} is out of range for {} lanes",
            indices[position], position, lanes
        )));
    }

    let mut seen = vec![false; logical_size];
    for lane in 0..logical_size {
        let source = indices[lanes - 1 - lane];
        if source >= logical_size {
            return Err(CompileError::InvalidPermutation(format!(
                "lane {} reads padding lane {} (logical size {})",
                lane, source, logical_size
            )));
        }
        if seen[source] {
            return Err(CompileError::InvalidPermutation(format!(
                "lane {} is the partner of more than one lane",
                source
            )));
        }
        seen[source] = true;
    }
    Ok(())
}

/// Side of `lane` in a permutation given in generator order
///
/// A lane is `Low` iff the entry read in reverse lane order points ahead
/// of it.
///
/// # Panics
///
/// Panics if `lane >= indices.len()`.
pub fn pair_side(indices: &[usize], lane: usize) -> PairSide {
    if indices[indices.len() - 1 - lane] > lane {
        PairSide::Low
    } else {
        PairSide::High
    }
}

/// A validated compare-exchange stage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation {
    indices: Vec<usize>,
    logical_size: usize,
}

impl Permutation {
    /// Creates a permutation where every lane is in use
    pub fn new(indices: Vec<usize>) -> Result<Self, CompileError> {
        let logical_size = indices.len();
        Self::with_logical_size(indices, logical_size)
    }

    /// Creates a permutation whose lanes from `logical_size` upward are padding
    pub fn with_logical_size(indices: Vec<usize>, logical_size: usize) -> Result<Self, CompileError> {
        validate(&indices, logical_size)?;
        Ok(Permutation {
            indices,
            logical_size,
        })
    }

    /// Creates a permutation from partner lanes listed in lane order
    pub fn from_partners(partners: &[usize], logical_size: usize) -> Result<Self, CompileError> {
        Self::with_logical_size(partners.iter().rev().copied().collect(), logical_size)
    }

    /// The identity stage over `lanes` lanes
    pub fn identity(lanes: usize) -> Result<Self, CompileError> {
        Self::new((0..lanes).rev().collect())
    }

    /// Entries in generator order (highest lane first)
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Total number of lanes, padding included
    pub fn lanes(&self) -> usize {
        self.indices.len()
    }

    /// Number of lanes that carry sorted data
    pub fn logical_size(&self) -> usize {
        self.logical_size
    }

    pub fn is_padding(&self, lane: usize) -> bool {
        lane >= self.logical_size
    }

    /// Lane whose value `lane` is compared against
    ///
    /// # Panics
    ///
    /// Panics if `lane >= self.lanes()`.
    pub fn partner(&self, lane: usize) -> usize {
        self.indices[self.lanes() - 1 - lane]
    }

    /// Partner of every lane, in lane order
    pub fn partners(&self) -> Vec<usize> {
        (0..self.lanes()).map(|lane| self.partner(lane)).collect()
    }

    /// Side of `lane`; panics under the same condition as [`Permutation::partner`]
    pub fn pair_side(&self, lane: usize) -> PairSide {
        pair_side(&self.indices, lane)
    }

    /// Bit `i` set iff lane `i` is `Low`
    pub fn low_lanes(&self) -> u64 {
        (0..self.lanes())
            .filter(|&lane| self.pair_side(lane) == PairSide::Low)
            .fold(0u64, |bits, lane| bits | (1u64 << lane))
    }

    /// True when every used lane compares against itself
    pub fn is_identity(&self) -> bool {
        (0..self.logical_size).all(|lane| self.partner(lane) == lane)
    }

    /// True when pairing is symmetric over the used lanes
    pub fn is_involution(&self) -> bool {
        (0..self.logical_size).all(|lane| self.partner(self.partner(lane)) == lane)
    }

    /// Extends the permutation to `lanes` lanes with self-mapped high lanes
    pub fn padded_to(&self, lanes: usize) -> Result<Self, CompileError> {
        if lanes < self.lanes() {
            return Err(CompileError::InvalidPermutation(format!(
                "cannot pad {} lanes down to {}",
                self.lanes(),
                lanes
            )));
        }
        let mut indices: Vec<usize> = (self.lanes()..lanes).rev().collect();
        indices.extend_from_slice(&self.indices);
        Ok(Permutation {
            indices,
            logical_size: self.logical_size,
        })
    }
}
