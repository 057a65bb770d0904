use crate::emulator::error::{Fault, LoadError};
use crate::util::bit_splitter::BitSplitter;

pub const MEM_SIZE: usize = 4096;
pub const LAST_ADDR: u16 = 0xFFF;
pub const PROGRAM_START: u16 = 0x200;
pub const FONT_START: u16 = 0x000;
pub const FONT_GLYPH_SIZE: u16 = 5;

/// Opcodes are only fetched below this address.
const FETCH_LIMIT: u16 = 0xFFE;

/// Built-in hexadecimal font, one 5 byte glyph per digit.
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The 4K address space. Every access is bounds-checked.
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    /// Create memory with the font loaded at `FONT_START`.
    pub fn new() -> Memory {
        let mut bytes = [0; MEM_SIZE];
        let font_start = FONT_START as usize;
        bytes[font_start..font_start + FONT.len()].copy_from_slice(&FONT);
        Memory { bytes }
    }

    /// Copy a program into memory at `PROGRAM_START`, one byte per byte.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        let start = PROGRAM_START as usize;
        let max = MEM_SIZE - start;
        if program.len() > max {
            return Err(LoadError::TooLarge { size: program.len(), max });
        }
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Fetch the big-endian opcode at `addr`.
    pub fn fetch(&self, addr: u16) -> Result<u16, Fault> {
        if addr >= FETCH_LIMIT {
            return Err(Fault::OutOfBounds { address: addr });
        }
        let left = self.bytes[addr as usize];
        let right = self.bytes[addr as usize + 1];
        Ok(BitSplitter::new(left, right).as_u16())
    }

    pub fn read(&self, addr: u16) -> Result<u8, Fault> {
        self.check_range(addr, 1)?;
        Ok(self.bytes[addr as usize])
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        self.check_range(addr, 1)?;
        self.bytes[addr as usize] = value;
        Ok(())
    }

    /// Borrow `len` bytes starting at `addr`.
    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault> {
        self.check_range(addr, len)?;
        let start = addr as usize;
        Ok(&self.bytes[start..start + len])
    }

    /// Mutably borrow `len` bytes starting at `addr`.
    pub fn slice_mut(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault> {
        self.check_range(addr, len)?;
        let start = addr as usize;
        Ok(&mut self.bytes[start..start + len])
    }

    /// Fails unless `addr..addr + len` lies within 0x000..=0xFFF.
    /// An empty range only requires `addr` itself to be valid.
    pub fn check_range(&self, addr: u16, len: usize) -> Result<(), Fault> {
        let last = addr as usize + len.saturating_sub(1);
        if last > LAST_ADDR as usize {
            let address = if addr > LAST_ADDR { addr } else { LAST_ADDR + 1 };
            return Err(Fault::OutOfBounds { address });
        }
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn font_is_loaded_at_start() {
        let memory = Memory::new();
        assert_eq!(memory.slice(0, 5).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        let f = 0xF * FONT_GLYPH_SIZE;
        assert_eq!(memory.slice(f, 5).unwrap(), &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        assert_eq!(memory.read(0x50).unwrap(), 0);
    }

    #[test]
    fn program_is_copied_byte_for_byte() {
        let mut memory = Memory::new();
        memory.load_program(&[0x60, 0x05, 0x70]).unwrap();
        assert_eq!(memory.slice(0x200, 4).unwrap(), &[0x60, 0x05, 0x70, 0x00]);
    }

    #[test]
    fn program_filling_memory_exactly_fits() {
        let mut memory = Memory::new();
        let program = vec![0xAB; MEM_SIZE - 0x200];
        assert_eq!(memory.load_program(&program), Ok(()));
        assert_eq!(memory.read(0xFFF), Ok(0xAB));
    }

    #[test]
    fn too_large_program_is_rejected() {
        let mut memory = Memory::new();
        let program = vec![0; MEM_SIZE - 0x200 + 1];
        assert_eq!(
            memory.load_program(&program),
            Err(LoadError::TooLarge { size: 3585, max: 3584 })
        );
    }

    #[test]
    fn fetch_is_big_endian() {
        let mut memory = Memory::new();
        memory.load_program(&[0x12, 0x34]).unwrap();
        assert_eq!(memory.fetch(0x200), Ok(0x1234));
    }

    #[test]
    fn fetch_near_the_end_faults() {
        let memory = Memory::new();
        assert_eq!(memory.fetch(0xFFD), Ok(0x0000));
        assert_eq!(memory.fetch(0xFFE), Err(Fault::OutOfBounds { address: 0xFFE }));
        assert_eq!(memory.fetch(0xFFF), Err(Fault::OutOfBounds { address: 0xFFF }));
    }

    #[test]
    fn single_byte_access_is_bounds_checked() {
        let mut memory = Memory::new();
        assert_eq!(memory.write(0xFFF, 7), Ok(()));
        assert_eq!(memory.read(0xFFF), Ok(7));
        assert_eq!(memory.write(0x1000, 7), Err(Fault::OutOfBounds { address: 0x1000 }));
        assert_eq!(memory.read(0x1000), Err(Fault::OutOfBounds { address: 0x1000 }));
    }

    #[test]
    fn ranges_past_the_end_fault() {
        let memory = Memory::new();
        assert!(memory.check_range(0xFFD, 3).is_ok());
        assert_eq!(memory.check_range(0xFFE, 3), Err(Fault::OutOfBounds { address: 0x1000 }));
        assert!(memory.check_range(0xFFF, 0).is_ok());
    }
}
