//! Sorting networks as ordered lists of compare-exchange stages

use crate::error::CompileError;
use crate::network::permutation::Permutation;

/// A sorting network over `size` elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    size: usize,
    stages: Vec<Permutation>,
}

impl Network {
    /// Creates a network; every stage must have the same logical size
    pub fn new(size: usize, stages: Vec<Permutation>) -> Result<Self, CompileError> {
        if let Some(stage) = stages.iter().find(|s| s.logical_size() != size) {
            return Err(CompileError::InvalidPermutation(format!(
                "stage has logical size {} in a network of size {}",
                stage.logical_size(),
                size
            )));
        }
        Ok(Network { size, stages })
    }

    /// Builds a network from a generator's flat index list
    ///
    /// The list is cut into consecutive stages of `lanes` entries each.
    pub fn from_flat(size: usize, lanes: usize, flat: &[usize]) -> Result<Self, CompileError> {
        if lanes == 0 || flat.len() % lanes != 0 {
            return Err(CompileError::InvalidPermutation(format!(
                "{} indices do not split into stages of {} lanes",
                flat.len(),
                lanes
            )));
        }
        let stages = flat
            .chunks(lanes)
            .map(|chunk| Permutation::with_logical_size(chunk.to_vec(), size))
            .collect::<Result<Vec<_>, _>>()?;
        Network::new(size, stages)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn stages(&self) -> &[Permutation] {
        &self.stages
    }

    pub fn depth(&self) -> usize {
        self.stages.len()
    }
}
