//! Simulated vector registers

use aligned_vec::AVec;

use crate::constants::REGISTER_ALIGNMENT;
use crate::network::{ElementWidth, RegisterWidth};

/// Contents of one vector register, byte 0 first
#[derive(Debug, Clone)]
pub struct Register {
    width: RegisterWidth,
    /// Storage for register bytes (AVec provides alignment)
    bytes: AVec<u8>,
}

impl Register {
    pub fn zeroed(width: RegisterWidth) -> Self {
        Register {
            width,
            bytes: AVec::from_iter(REGISTER_ALIGNMENT, (0..width.bytes()).map(|_| 0u8)),
        }
    }

    /// Creates a register from exactly `width.bytes()` bytes
    pub fn from_bytes(width: RegisterWidth, bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), width.bytes(), "Register size mismatch");
        Register {
            width,
            bytes: AVec::from_iter(REGISTER_ALIGNMENT, bytes.iter().copied()),
        }
    }

    pub fn width(&self) -> RegisterWidth {
        self.width
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn lanes(&self, lane: ElementWidth) -> usize {
        self.width.lanes(lane)
    }

    /// Little-endian value of lane `index`, zero-extended
    pub fn lane(&self, lane: ElementWidth, index: usize) -> u64 {
        let k = lane.bytes();
        self.bytes[index * k..(index + 1) * k]
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64)
    }

    /// Stores the low bytes of `value` into lane `index`
    pub fn set_lane(&mut self, lane: ElementWidth, index: usize, value: u64) {
        let k = lane.bytes();
        let bytes = value.to_le_bytes();
        self.bytes[index * k..(index + 1) * k].copy_from_slice(&bytes[..k]);
    }
}

impl PartialEq for Register {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Register {}
