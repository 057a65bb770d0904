//! The CPU engine: owns the machine state and executes one instruction per step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::emulator::decoder;
use crate::emulator::error::{Fault, LoadError, StepError};
use crate::emulator::input::{DummyInput, EmulatorInput};
use crate::emulator::instruction::*;
use crate::emulator::memory::{Memory, FONT_GLYPH_SIZE, FONT_START, LAST_ADDR, PROGRAM_START};
use crate::emulator::output::{DummyOutput, EmulatorOutput, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::emulator::stack::Stack;

const NUM_REGISTERS: usize = 16;
const FLAG: usize = 0xF;

/// Whether the emulator still accepts steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Terminal. Build a new emulator to start over.
    Halted,
}

pub struct Emulator<I: EmulatorInput, O: EmulatorOutput> {
    // Standard fields
    memory: Memory,
    registers: [u8; NUM_REGISTERS],
    delay_timer: u8,
    sound_timer: u8,
    i: u16,
    program_counter: u16,
    stack: Stack,

    fault: Option<StepError>,
    rng: StdRng,

    input: I,
    output: O,
}

impl Emulator<DummyInput, DummyOutput> {
    /// Create a new emulator with dummy input and output
    pub fn new() -> Self {
        Emulator::with_io(DummyInput, DummyOutput::new())
    }
}

impl Default for Emulator<DummyInput, DummyOutput> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: EmulatorInput, O: EmulatorOutput> Emulator<I, O> {
    /// Create a new emulator with input and output
    pub fn with_io(input: I, output: O) -> Emulator<I, O> {
        Emulator {
            memory: Memory::new(),
            registers: [0; NUM_REGISTERS],
            delay_timer: 0,
            sound_timer: 0,
            i: 0,
            program_counter: PROGRAM_START,
            stack: Stack::new(),

            fault: None,
            rng: StdRng::from_entropy(),

            input,
            output,
        }
    }

    /// Use a fixed seed for `RND`, making runs reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Copy a program into memory at 0x200.
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.memory.load_program(program)?;
        log::debug!("Loaded {} bytes at {:#05x}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Fetch the instruction at the program counter and execute it.
    pub fn step(&mut self) -> Result<(), StepError> {
        self.check_running()?;

        // Each opcode is two bytes
        let pc = self.program_counter;
        let opcode = self.memory.fetch(pc).map_err(|fault| self.halt(pc, None, fault))?;
        let decoded = decoder::decode(opcode).map_err(|fault| self.halt(pc, Some(opcode), fault))?;
        let instruction = decoded.instruction();

        log::trace!("{:#05x}: {:#06x} {}", pc, opcode, instruction);

        self.execute(instruction)
            .map_err(|fault| self.halt(pc, Some(opcode), fault))
    }

    /// Execute a single instruction as if it was fetched at the program counter.
    pub fn execute_single(&mut self, instruction: Instruction) -> Result<(), StepError> {
        self.check_running()?;
        let pc = self.program_counter;
        self.execute(instruction)
            .map_err(|fault| self.halt(pc, Some(instruction.to_u16()), fault))
    }

    /// Execute instructions in order, stopping at the first fault.
    pub fn execute_many(&mut self, instructions: &[Instruction]) -> Result<(), StepError> {
        for instruction in instructions {
            self.execute_single(*instruction)?;
        }
        Ok(())
    }

    /// Decrement both timers by one. The host calls this at 60 Hz.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn state(&self) -> RunState {
        match self.fault {
            Some(_) => RunState::Halted,
            None => RunState::Running,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.state() == RunState::Halted
    }

    /// The fault that halted the emulator, if any.
    pub fn fault(&self) -> Option<StepError> {
        self.fault
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn register(&self, x: u8) -> u8 {
        self.registers[(x & 0xF) as usize]
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        &self.registers
    }

    /// The index register I.
    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    fn check_running(&self) -> Result<(), StepError> {
        match self.fault {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn halt(&mut self, pc: u16, opcode: Option<u16>, fault: Fault) -> StepError {
        let error = StepError { pc, opcode, fault };
        log::warn!("{}", error);
        self.fault = Some(error);
        error
    }

    fn next_instruction(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(2);
    }

    fn skip_instruction(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(4);
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.skip_instruction();
        } else {
            self.next_instruction();
        }
    }

    fn v(&self, Reg(x): Reg) -> u8 {
        self.registers[(x & 0xF) as usize]
    }

    fn set_v(&mut self, Reg(x): Reg, value: u8) {
        self.registers[(x & 0xF) as usize] = value;
    }

    /// Write a result and then the flag, so VF holds the flag even when x is F.
    fn set_v_with_flag(&mut self, x: Reg, value: u8, flag: bool) {
        self.set_v(x, value);
        self.registers[FLAG] = flag as u8;
    }

    /// Execute a single instruction. Faults leave the program counter untouched.
    fn execute(&mut self, instruction: Instruction) -> Result<(), Fault> {
        match instruction {
            // Machine code routines are not emulated
            Instruction::MachineCall(_) => self.next_instruction(),

            Instruction::ClearScreen => {
                self.output.clear_display();
                self.next_instruction();
            }

            // Return to the previous call site via the stack.
            Instruction::Return => {
                self.program_counter = self.stack.pop()?;
            }

            Instruction::Goto(Addr(addr)) => {
                self.program_counter = addr;
            }

            // Store the return address on the stack, then jump to the specified address
            Instruction::Call(Addr(addr)) => {
                self.stack.push(self.program_counter.wrapping_add(2))?;
                self.program_counter = addr;
            }

            Instruction::IfRegEqConst(x, Const(n)) => self.skip_if(self.v(x) == n),

            Instruction::IfRegNeqConst(x, Const(n)) => self.skip_if(self.v(x) != n),

            Instruction::IfRegEqReg(x, y) => self.skip_if(self.v(x) == self.v(y)),

            Instruction::IfRegNeqReg(x, y) => self.skip_if(self.v(x) != self.v(y)),

            Instruction::SetRegToConst(x, Const(n)) => {
                self.set_v(x, n);
                self.next_instruction();
            }

            // Wraps around without touching VF
            Instruction::IncRegByConst(x, Const(n)) => {
                self.set_v(x, self.v(x).wrapping_add(n));
                self.next_instruction();
            }

            Instruction::SetRegToReg(x, y) => {
                self.set_v(x, self.v(y));
                self.next_instruction();
            }

            Instruction::BitwiseOr(x, y) => {
                self.set_v(x, self.v(x) | self.v(y));
                self.next_instruction();
            }

            Instruction::BitwiseAnd(x, y) => {
                self.set_v(x, self.v(x) & self.v(y));
                self.next_instruction();
            }

            Instruction::BitwiseXor(x, y) => {
                self.set_v(x, self.v(x) ^ self.v(y));
                self.next_instruction();
            }

            // VF is 1 on carry
            Instruction::IncRegByReg(x, y) => {
                let (sum, carry) = self.v(x).overflowing_add(self.v(y));
                self.set_v_with_flag(x, sum, carry);
                self.next_instruction();
            }

            // VF is 1 when there is no borrow
            Instruction::DecRegByReg(x, y) => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_v_with_flag(x, vx.wrapping_sub(vy), vx >= vy);
                self.next_instruction();
            }

            Instruction::SetVxVyMinusVx(x, y) => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_v_with_flag(x, vy.wrapping_sub(vx), vy >= vx);
                self.next_instruction();
            }

            // VF gets the bit shifted out
            Instruction::BitshiftRight(x) => {
                let vx = self.v(x);
                self.set_v_with_flag(x, vx >> 1, vx & 1 == 1);
                self.next_instruction();
            }

            Instruction::BitshiftLeft(x) => {
                let vx = self.v(x);
                self.set_v_with_flag(x, vx << 1, vx >> 7 == 1);
                self.next_instruction();
            }

            Instruction::SetI(Addr(addr)) => {
                self.i = addr & LAST_ADDR;
                self.next_instruction();
            }

            Instruction::SetPcToV0PlusAddr(Addr(addr)) => {
                self.program_counter = (self.registers[0] as u16).wrapping_add(addr);
            }

            Instruction::SetVxRand(x, Const(n)) => {
                let random: u8 = self.rng.gen();
                self.set_v(x, random & n);
                self.next_instruction();
            }

            Instruction::Draw(x, y, Const(sprite_height)) => {
                // Get coordinates before VF is reset, either could be VF
                let x_coord = self.v(x) as usize;
                let y_coord = self.v(y) as usize;

                // Get sprite, each row is 8 bits
                let sprite = self.memory.slice(self.i, (sprite_height & 0xF) as usize)?;

                self.registers[FLAG] = 0;
                let mut any_collisions = false;
                for (row, bits) in sprite.iter().enumerate() {
                    for column in 0..8 {
                        if bits >> (7 - column) & 1 == 0 {
                            continue;
                        }
                        let px = (x_coord + column) % SCREEN_WIDTH;
                        let py = (y_coord + row) % SCREEN_HEIGHT;
                        any_collisions |= self.output.draw_pixel(px, py, true);
                    }
                }

                // Set VF collision flag
                self.registers[FLAG] = any_collisions as u8;
                self.next_instruction();
            }

            Instruction::IfKeyPressed(x) => {
                let pressed = self.input.is_pressed(self.v(x));
                self.skip_if(pressed);
            }

            Instruction::IfKeyNotPressed(x) => {
                let pressed = self.input.is_pressed(self.v(x));
                self.skip_if(!pressed);
            }

            Instruction::SetRegToDelayTimer(x) => {
                self.set_v(x, self.delay_timer);
                self.next_instruction();
            }

            // Poll for a key, staying on this instruction until one arrives
            Instruction::SetRegToGetKey(x) => match self.input.get_key() {
                Some(key) => {
                    log::debug!("Got key {:X} for {}", key, x);
                    self.set_v(x, key);
                    self.next_instruction();
                }
                None => log::trace!("Waiting for key at {:#05x}", self.program_counter),
            },

            Instruction::SetDelayTimerToReg(x) => {
                self.delay_timer = self.v(x);
                log::debug!("Delay timer set to {}", self.delay_timer);
                self.next_instruction();
            }

            Instruction::SetSoundTimerToReg(x) => {
                self.sound_timer = self.v(x);
                log::debug!("Sound timer set to {}", self.sound_timer);
                self.next_instruction();
            }

            // I stays within 12 bits
            Instruction::AddRegToI(x) => {
                self.i = (self.i + self.v(x) as u16) & LAST_ADDR;
                self.next_instruction();
            }

            // Set i to character address. Each font element is 5 bytes wide.
            Instruction::SetIToSpriteAddrVx(x) => {
                let digit = self.v(x);
                if digit > 0xF {
                    return Err(Fault::InvalidDigit { value: digit });
                }
                self.i = FONT_START + digit as u16 * FONT_GLYPH_SIZE;
                self.next_instruction();
            }

            Instruction::SetIToBcdOfReg(x) => {
                let value = self.v(x);
                let digits = self.memory.slice_mut(self.i, 3)?;
                digits.copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
                self.next_instruction();
            }

            // Dump register values up to Vx
            Instruction::RegDump(Reg(x)) => {
                let count = (x & 0xF) as usize + 1;
                let target = self.memory.slice_mut(self.i, count)?;
                target.copy_from_slice(&self.registers[..count]);
                self.next_instruction();
            }

            // Load register values up to Vx
            Instruction::RegLoad(Reg(x)) => {
                let count = (x & 0xF) as usize + 1;
                let source = self.memory.slice(self.i, count)?;
                self.registers[..count].copy_from_slice(source);
                self.next_instruction();
            }
        };

        Ok(())
    }
}
