//! Vector register widths a stage can be compiled into

use crate::constants::{LANE_GROUP_BYTES, XMM_BYTES, YMM_BYTES, ZMM_BYTES};
use crate::network::element::ElementWidth;

/// A 128, 256 or 512-bit vector register
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegisterWidth {
    /// 128-bit xmm register
    Xmm,
    /// 256-bit ymm register
    Ymm,
    /// 512-bit zmm register
    Zmm,
}

impl RegisterWidth {
    pub const ALL: [RegisterWidth; 3] = [RegisterWidth::Xmm, RegisterWidth::Ymm, RegisterWidth::Zmm];

    /// Register size in bytes
    pub fn bytes(self) -> usize {
        match self {
            RegisterWidth::Xmm => XMM_BYTES,
            RegisterWidth::Ymm => YMM_BYTES,
            RegisterWidth::Zmm => ZMM_BYTES,
        }
    }

    /// Smallest register that holds `bytes` bytes
    pub fn fitting(bytes: usize) -> Option<Self> {
        RegisterWidth::ALL.into_iter().find(|r| r.bytes() >= bytes)
    }

    /// Number of 16-byte lane groups in the register
    pub fn lane_groups(self) -> usize {
        self.bytes() / LANE_GROUP_BYTES
    }

    /// Number of lanes of the given width
    pub fn lanes(self, width: ElementWidth) -> usize {
        self.bytes() / width.bytes()
    }

    pub fn name(self) -> &'static str {
        match self {
            RegisterWidth::Xmm => "xmm",
            RegisterWidth::Ymm => "ymm",
            RegisterWidth::Zmm => "zmm",
        }
    }
}
