use crate::emulator::error::Fault;

pub const STACK_SIZE: usize = 16;

/// The call stack of return addresses.
pub struct Stack {
    entries: [u16; STACK_SIZE],
    depth: usize,
}

impl Stack {
    pub fn new() -> Stack {
        Stack {
            entries: [0; STACK_SIZE],
            depth: 0,
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        if self.depth == STACK_SIZE {
            return Err(Fault::StackOverflow);
        }
        self.entries[self.depth] = addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        if self.depth == 0 {
            return Err(Fault::StackUnderflow);
        }
        self.depth -= 1;
        Ok(self.entries[self.depth])
    }

    /// Number of addresses currently on the stack.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The stack pointer, -1 when empty and 15 when full.
    pub fn pointer(&self) -> i8 {
        self.depth as i8 - 1
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
