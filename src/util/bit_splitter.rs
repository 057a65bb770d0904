/// A structure for easily splitting an opcode
/// into its instruction family and masked operand fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSplitter(u8, u8);

impl BitSplitter {
    pub fn from_u16(value: u16) -> BitSplitter {
        BitSplitter((value >> 8) as u8, (value & 0x00FF) as u8)
    }

    /// Build an opcode from two bytes in memory order (big-endian).
    pub fn new(left: u8, right: u8) -> BitSplitter {
        BitSplitter(left, right)
    }

    /// Left-shift the first u8-component 8 bits,
    /// then take bitwise or with the second component
    /// in order to store the components in a u16.
    pub fn as_u16(&self) -> u16 {
        ((self.0 as u16) << 8) | self.1 as u16
    }

    /// The most significant nibble, which selects the instruction family.
    pub fn high_nibble(&self) -> u8 {
        self.0 >> 4
    }

    /// Mask out a field and shift it down to the lowest bits.
    pub fn extract(&self, mask: u16, shift: u8) -> u16 {
        (self.as_u16() & mask) >> shift
    }

    /// Whether the fixed bits selected by `mask` equal `pattern`.
    pub fn matches(&self, mask: u16, pattern: u16) -> bool {
        self.as_u16() & mask == pattern
    }
}
