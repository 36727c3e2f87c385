//! Element types sorted inside a register

use std::fmt;

/// Byte width of one sorted element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementWidth {
    B1,
    B2,
    B4,
    B8,
}

impl ElementWidth {
    /// All widths from narrowest to widest
    pub const ALL: [ElementWidth; 4] = [
        ElementWidth::B1,
        ElementWidth::B2,
        ElementWidth::B4,
        ElementWidth::B8,
    ];

    /// Size of the element in bytes
    pub fn bytes(self) -> usize {
        match self {
            ElementWidth::B1 => 1,
            ElementWidth::B2 => 2,
            ElementWidth::B4 => 4,
            ElementWidth::B8 => 8,
        }
    }

    /// Width with the given byte size, if it is one of 1, 2, 4 or 8
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(ElementWidth::B1),
            2 => Some(ElementWidth::B2),
            4 => Some(ElementWidth::B4),
            8 => Some(ElementWidth::B8),
            _ => None,
        }
    }

    /// Widths strictly wider than this one, narrowest first
    pub fn wider(self) -> impl Iterator<Item = ElementWidth> {
        ElementWidth::ALL.into_iter().filter(move |w| *w > self)
    }

    /// Sign bit of an element of this width, placed in a u64
    pub fn sign_bit(self) -> u64 {
        1u64 << (self.bytes() * 8 - 1)
    }
}

/// Whether elements compare as signed or unsigned integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// Integer element type: width plus signedness
///
/// Signedness only selects the compare instruction variant; it never
/// influences how lanes are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementType {
    pub width: ElementWidth,
    pub signedness: Signedness,
}

impl ElementType {
    pub const U8: ElementType = ElementType::new(ElementWidth::B1, Signedness::Unsigned);
    pub const I8: ElementType = ElementType::new(ElementWidth::B1, Signedness::Signed);
    pub const U16: ElementType = ElementType::new(ElementWidth::B2, Signedness::Unsigned);
    pub const I16: ElementType = ElementType::new(ElementWidth::B2, Signedness::Signed);
    pub const U32: ElementType = ElementType::new(ElementWidth::B4, Signedness::Unsigned);
    pub const I32: ElementType = ElementType::new(ElementWidth::B4, Signedness::Signed);
    pub const U64: ElementType = ElementType::new(ElementWidth::B8, Signedness::Unsigned);
    pub const I64: ElementType = ElementType::new(ElementWidth::B8, Signedness::Signed);

    /// Every supported element type
    pub const ALL: [ElementType; 8] = [
        ElementType::U8,
        ElementType::I8,
        ElementType::U16,
        ElementType::I16,
        ElementType::U32,
        ElementType::I32,
        ElementType::U64,
        ElementType::I64,
    ];

    pub const fn new(width: ElementWidth, signedness: Signedness) -> Self {
        ElementType { width, signedness }
    }

    pub fn bytes(&self) -> usize {
        self.width.bytes()
    }

    pub fn is_signed(&self) -> bool {
        self.signedness == Signedness::Signed
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_signed() { 'i' } else { 'u' };
        write!(f, "{}{}", prefix, self.bytes() * 8)
    }
}
