//! Everything that can stop the emulator.

use std::fmt;

/// A fatal condition raised while executing a program.
/// Any fault halts the emulator for good.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("memory access out of bounds at {address:#05x}")]
    OutOfBounds { address: u16 },

    #[error("stack overflow: more than 16 nested calls")]
    StackOverflow,

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("unknown opcode {opcode:#06x}")]
    UnknownOpcode { opcode: u16 },

    #[error("no font sprite for {value:#04x}, digits go up to 0xF")]
    InvalidDigit { value: u8 },
}

/// A fault together with where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepError {
    /// Program counter of the faulting instruction.
    pub pc: u16,
    /// The raw opcode, if one was fetched.
    pub opcode: Option<u16>,
    pub fault: Fault,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Some(opcode) => write!(
                f,
                "halted at pc {:#05x} (opcode {:#06x}): {}",
                self.pc, opcode, self.fault
            ),
            None => write!(f, "halted at pc {:#05x}: {}", self.pc, self.fault),
        }
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.fault)
    }
}

/// Errors when copying a program into memory.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error("program is {size} bytes, but only {max} bytes fit in memory")]
    TooLarge { size: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_reports_pc_and_opcode() {
        let error = StepError {
            pc: 0x204,
            opcode: Some(0x5001),
            fault: Fault::UnknownOpcode { opcode: 0x5001 },
        };
        assert_eq!(
            error.to_string(),
            "halted at pc 0x204 (opcode 0x5001): unknown opcode 0x5001"
        );
    }

    #[test]
    fn step_error_without_opcode() {
        let error = StepError {
            pc: 0xFFE,
            opcode: None,
            fault: Fault::OutOfBounds { address: 0xFFE },
        };
        assert_eq!(
            error.to_string(),
            "halted at pc 0xffe: memory access out of bounds at 0xffe"
        );
    }
}
