//! Width promotion
//!
//! A permutation over narrow lanes can sometimes be re-expressed over
//! coarser synthetic lanes: when every aligned block of `k` lanes moves as
//! a unit to another aligned block and keeps its internal order, the stage
//! moves the same bytes as a permutation over `k`-times wider lanes. Wider
//! lanes unlock immediate shuffles and narrower permute index vectors.
//!
//! Promotion only changes how the permute step is encoded. The compare and
//! blend steps always run at the element's own width.

use crate::network::{ElementWidth, Permutation};

/// A permutation re-expressed over wider synthetic lanes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Width of the synthetic lanes
    pub width: ElementWidth,
    /// Number of narrow lanes per synthetic lane
    pub factor: usize,
    pub permutation: Permutation,
}

/// Shrinks `perm` by `factor`, if every block of `factor` lanes moves whole
///
/// Checked in generator order: for each block start `g`, the entry at `g`
/// must be the last slot of its target block (`π[g] % k == k - 1`) and the
/// following entries must count down from it (`π[g + j] == π[g] - j`).
pub fn promote(perm: &Permutation, factor: usize) -> Option<Permutation> {
    let indices = perm.indices();
    if factor < 2 || indices.len() % factor != 0 {
        return None;
    }

    let mut shrunk = Vec::with_capacity(indices.len() / factor);
    for block in indices.chunks(factor) {
        let head = block[0];
        if head % factor != factor - 1 {
            return None;
        }
        if block.iter().enumerate().any(|(j, &index)| index != head - j) {
            return None;
        }
        shrunk.push(head / factor);
    }

    let logical_size = perm.logical_size().div_ceil(factor);
    Permutation::with_logical_size(shrunk, logical_size).ok()
}

/// Every promotion of a `width`-lane permutation up to 8-byte lanes
///
/// Ordered from the narrowest synthetic width to the widest.
pub fn promotions(perm: &Permutation, width: ElementWidth) -> Vec<Promotion> {
    width
        .wider()
        .filter_map(|wider| {
            let factor = wider.bytes() / width.bytes();
            match promote(perm, factor) {
                Some(permutation) => {
                    log::trace!("promotion x{} to {} bytes accepted", factor, wider.bytes());
                    Some(Promotion {
                        width: wider,
                        factor,
                        permutation,
                    })
                }
                None => {
                    log::trace!("promotion x{} to {} bytes rejected", factor, wider.bytes());
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_block_swap() {
        // bitonic-16 half-cleaner at distance 4: blocks of four swap
        let perm = Permutation::new(vec![11, 10, 9, 8, 15, 14, 13, 12, 3, 2, 1, 0, 7, 6, 5, 4]).unwrap();
        let by_four = promote(&perm, 4).unwrap();
        assert_eq!(by_four.indices(), &[2, 3, 0, 1]);
        assert_eq!(promote(&by_four, 2), None);
        assert_eq!(promote(&perm, 8), None);
    }

    #[test]
    fn test_promote_rejects_reordered_block() {
        // adjacent swap moves single lanes
        let perm = Permutation::new(vec![6, 7, 4, 5, 2, 3, 0, 1]).unwrap();
        assert_eq!(promote(&perm, 2), None);
    }

    #[test]
    fn test_promotions_lists_every_width() {
        let perm = Permutation::new(vec![8, 9, 10, 11, 12, 13, 14, 15, 0, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        let widths: Vec<ElementWidth> = promotions(&perm, ElementWidth::B1)
            .into_iter()
            .map(|p| p.width)
            .collect();
        // only single lanes move, nothing promotes
        assert!(widths.is_empty());

        let perm = Permutation::new(vec![7, 6, 5, 4, 3, 2, 1, 0]).unwrap();
        let promoted = promotions(&perm, ElementWidth::B1);
        assert_eq!(promoted.len(), 3);
        assert_eq!(promoted[2].width, ElementWidth::B8);
        assert_eq!(promoted[2].permutation.indices(), &[0]);
    }

    #[test]
    fn test_logical_size_rounds_up() {
        // six used lanes padded to eight, all identity
        let perm = Permutation::with_logical_size(vec![7, 6, 5, 4, 3, 2, 1, 0], 6).unwrap();
        let shrunk = promote(&perm, 4).unwrap();
        assert_eq!(shrunk.logical_size(), 2);
    }
}
