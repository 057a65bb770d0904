//! The CHIP-8 instruction set.
//!
//! [`INSTRUCTION_TABLE`] describes how every opcode family is recognised
//! and where its operands live, while [`Instruction`] is the typed form
//! the emulator executes.

use std::fmt;

use crate::emulator::decoder;
use crate::emulator::error::Fault;
use crate::util::bit_splitter::BitSplitter;

/// A wrapper for addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr(pub u16);

/// A wrapper for registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(pub u8);

/// A wrapper for constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const(pub u8);

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05x}", self.0)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:X}", self.0)
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// The name of an opcode family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Sys,
    Cls,
    Ret,
    JpAddr,
    CallAddr,
    SeVxByte,
    SneVxByte,
    SeVxVy,
    LdVxByte,
    AddVxByte,
    LdVxVy,
    OrVxVy,
    AndVxVy,
    XorVxVy,
    AddVxVy,
    SubVxVy,
    ShrVx,
    SubnVxVy,
    ShlVx,
    SneVxVy,
    LdIAddr,
    JpV0Addr,
    RndVxByte,
    DrwVxVyNibble,
    SkpVx,
    SknpVx,
    LdVxDt,
    LdVxK,
    LdDtVx,
    LdStVx,
    AddIVx,
    LdFVx,
    LdBVx,
    LdMemVx,
    LdVxMem,
}

impl Mnemonic {
    /// Assembly syntax of the family, e.g. `LD Vx, byte`.
    pub fn syntax(self) -> &'static str {
        match self {
            Mnemonic::Sys => "SYS addr",
            Mnemonic::Cls => "CLS",
            Mnemonic::Ret => "RET",
            Mnemonic::JpAddr => "JP addr",
            Mnemonic::CallAddr => "CALL addr",
            Mnemonic::SeVxByte => "SE Vx, byte",
            Mnemonic::SneVxByte => "SNE Vx, byte",
            Mnemonic::SeVxVy => "SE Vx, Vy",
            Mnemonic::LdVxByte => "LD Vx, byte",
            Mnemonic::AddVxByte => "ADD Vx, byte",
            Mnemonic::LdVxVy => "LD Vx, Vy",
            Mnemonic::OrVxVy => "OR Vx, Vy",
            Mnemonic::AndVxVy => "AND Vx, Vy",
            Mnemonic::XorVxVy => "XOR Vx, Vy",
            Mnemonic::AddVxVy => "ADD Vx, Vy",
            Mnemonic::SubVxVy => "SUB Vx, Vy",
            Mnemonic::ShrVx => "SHR Vx",
            Mnemonic::SubnVxVy => "SUBN Vx, Vy",
            Mnemonic::ShlVx => "SHL Vx",
            Mnemonic::SneVxVy => "SNE Vx, Vy",
            Mnemonic::LdIAddr => "LD I, addr",
            Mnemonic::JpV0Addr => "JP V0, addr",
            Mnemonic::RndVxByte => "RND Vx, byte",
            Mnemonic::DrwVxVyNibble => "DRW Vx, Vy, nibble",
            Mnemonic::SkpVx => "SKP Vx",
            Mnemonic::SknpVx => "SKNP Vx",
            Mnemonic::LdVxDt => "LD Vx, DT",
            Mnemonic::LdVxK => "LD Vx, K",
            Mnemonic::LdDtVx => "LD DT, Vx",
            Mnemonic::LdStVx => "LD ST, Vx",
            Mnemonic::AddIVx => "ADD I, Vx",
            Mnemonic::LdFVx => "LD F, Vx",
            Mnemonic::LdBVx => "LD B, Vx",
            Mnemonic::LdMemVx => "LD [I], Vx",
            Mnemonic::LdVxMem => "LD Vx, [I]",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.syntax())
    }
}

/// Where an operand lives inside an opcode: `(opcode & mask) >> shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandField {
    pub mask: u16,
    pub shift: u8,
}

/// Static description of one opcode family.
///
/// An opcode belongs to the family when `opcode & mask == pattern`.
#[derive(Debug, PartialEq, Eq)]
pub struct InstructionSpec {
    pub mnemonic: Mnemonic,
    pub mask: u16,
    pub pattern: u16,
    pub operands: &'static [OperandField],
}

impl InstructionSpec {
    pub fn matches(&self, opcode: u16) -> bool {
        BitSplitter::from_u16(opcode).matches(self.mask, self.pattern)
    }

    /// Number of fixed bits, more fixed bits means a narrower match.
    pub fn fixed_bits(&self) -> u32 {
        self.mask.count_ones()
    }
}

const X: OperandField = OperandField { mask: 0x0F00, shift: 8 };
const Y: OperandField = OperandField { mask: 0x00F0, shift: 4 };
const N: OperandField = OperandField { mask: 0x000F, shift: 0 };
const KK: OperandField = OperandField { mask: 0x00FF, shift: 0 };
const NNN: OperandField = OperandField { mask: 0x0FFF, shift: 0 };

const fn spec(
    mnemonic: Mnemonic,
    mask: u16,
    pattern: u16,
    operands: &'static [OperandField],
) -> InstructionSpec {
    InstructionSpec { mnemonic, mask, pattern, operands }
}

// Within a family, entries are tried top to bottom. SYS must come after
// CLS and RET, or it would claim 00E0 and 00EE.
static FAMILY_0: [InstructionSpec; 3] = [
    spec(Mnemonic::Cls, 0xFFFF, 0x00E0, &[]),
    spec(Mnemonic::Ret, 0xFFFF, 0x00EE, &[]),
    spec(Mnemonic::Sys, 0xF000, 0x0000, &[NNN]),
];
static FAMILY_1: [InstructionSpec; 1] = [spec(Mnemonic::JpAddr, 0xF000, 0x1000, &[NNN])];
static FAMILY_2: [InstructionSpec; 1] = [spec(Mnemonic::CallAddr, 0xF000, 0x2000, &[NNN])];
static FAMILY_3: [InstructionSpec; 1] = [spec(Mnemonic::SeVxByte, 0xF000, 0x3000, &[X, KK])];
static FAMILY_4: [InstructionSpec; 1] = [spec(Mnemonic::SneVxByte, 0xF000, 0x4000, &[X, KK])];
static FAMILY_5: [InstructionSpec; 1] = [spec(Mnemonic::SeVxVy, 0xF00F, 0x5000, &[X, Y])];
static FAMILY_6: [InstructionSpec; 1] = [spec(Mnemonic::LdVxByte, 0xF000, 0x6000, &[X, KK])];
static FAMILY_7: [InstructionSpec; 1] = [spec(Mnemonic::AddVxByte, 0xF000, 0x7000, &[X, KK])];
static FAMILY_8: [InstructionSpec; 9] = [
    spec(Mnemonic::LdVxVy, 0xF00F, 0x8000, &[X, Y]),
    spec(Mnemonic::OrVxVy, 0xF00F, 0x8001, &[X, Y]),
    spec(Mnemonic::AndVxVy, 0xF00F, 0x8002, &[X, Y]),
    spec(Mnemonic::XorVxVy, 0xF00F, 0x8003, &[X, Y]),
    spec(Mnemonic::AddVxVy, 0xF00F, 0x8004, &[X, Y]),
    spec(Mnemonic::SubVxVy, 0xF00F, 0x8005, &[X, Y]),
    spec(Mnemonic::ShrVx, 0xF00F, 0x8006, &[X]),
    spec(Mnemonic::SubnVxVy, 0xF00F, 0x8007, &[X, Y]),
    spec(Mnemonic::ShlVx, 0xF00F, 0x800E, &[X]),
];
static FAMILY_9: [InstructionSpec; 1] = [spec(Mnemonic::SneVxVy, 0xF00F, 0x9000, &[X, Y])];
static FAMILY_A: [InstructionSpec; 1] = [spec(Mnemonic::LdIAddr, 0xF000, 0xA000, &[NNN])];
static FAMILY_B: [InstructionSpec; 1] = [spec(Mnemonic::JpV0Addr, 0xF000, 0xB000, &[NNN])];
static FAMILY_C: [InstructionSpec; 1] = [spec(Mnemonic::RndVxByte, 0xF000, 0xC000, &[X, KK])];
static FAMILY_D: [InstructionSpec; 1] = [spec(Mnemonic::DrwVxVyNibble, 0xF000, 0xD000, &[X, Y, N])];
static FAMILY_E: [InstructionSpec; 2] = [
    spec(Mnemonic::SkpVx, 0xF0FF, 0xE09E, &[X]),
    spec(Mnemonic::SknpVx, 0xF0FF, 0xE0A1, &[X]),
];
static FAMILY_F: [InstructionSpec; 9] = [
    spec(Mnemonic::LdVxDt, 0xF0FF, 0xF007, &[X]),
    spec(Mnemonic::LdVxK, 0xF0FF, 0xF00A, &[X]),
    spec(Mnemonic::LdDtVx, 0xF0FF, 0xF015, &[X]),
    spec(Mnemonic::LdStVx, 0xF0FF, 0xF018, &[X]),
    spec(Mnemonic::AddIVx, 0xF0FF, 0xF01E, &[X]),
    spec(Mnemonic::LdFVx, 0xF0FF, 0xF029, &[X]),
    spec(Mnemonic::LdBVx, 0xF0FF, 0xF033, &[X]),
    spec(Mnemonic::LdMemVx, 0xF0FF, 0xF055, &[X]),
    spec(Mnemonic::LdVxMem, 0xF0FF, 0xF065, &[X]),
];

/// All opcode families, indexed by the high nibble of the opcode.
/// The order inside each family is the match priority.
pub static INSTRUCTION_TABLE: [&[InstructionSpec]; 16] = [
    &FAMILY_0, &FAMILY_1, &FAMILY_2, &FAMILY_3, &FAMILY_4, &FAMILY_5, &FAMILY_6, &FAMILY_7,
    &FAMILY_8, &FAMILY_9, &FAMILY_A, &FAMILY_B, &FAMILY_C, &FAMILY_D, &FAMILY_E, &FAMILY_F,
];

/// Every table entry in priority order.
pub fn all_specs() -> impl Iterator<Item = &'static InstructionSpec> {
    INSTRUCTION_TABLE.iter().flat_map(|family| family.iter())
}

/// A single instruction from the CHIP-8 instruction set.
/// Two bytes written in hexadecimal, with the following special characters:
/// - NNN: address
/// - NN: 8-bit constant
/// - N: 4-bit constant
/// - X and Y: 4-bit register identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    MachineCall(Addr),             // 0NNN
    ClearScreen,                   // 00E0
    Return,                        // 00EE
    Goto(Addr),                    // 1NNN
    Call(Addr),                    // 2NNN
    IfRegEqConst(Reg, Const),      // 3XNN
    IfRegNeqConst(Reg, Const),     // 4XNN
    IfRegEqReg(Reg, Reg),          // 5XY0
    SetRegToConst(Reg, Const),     // 6XNN
    IncRegByConst(Reg, Const),     // 7XNN
    SetRegToReg(Reg, Reg),         // 8XY0
    BitwiseOr(Reg, Reg),           // 8XY1
    BitwiseAnd(Reg, Reg),          // 8XY2
    BitwiseXor(Reg, Reg),          // 8XY3
    IncRegByReg(Reg, Reg),         // 8XY4
    DecRegByReg(Reg, Reg),         // 8XY5
    BitshiftRight(Reg),            // 8XY6
    SetVxVyMinusVx(Reg, Reg),      // 8XY7
    BitshiftLeft(Reg),             // 8XYE
    IfRegNeqReg(Reg, Reg),         // 9XY0
    SetI(Addr),                    // ANNN
    SetPcToV0PlusAddr(Addr),       // BNNN
    SetVxRand(Reg, Const),         // CXNN
    Draw(Reg, Reg, Const),         // DXYN
    IfKeyPressed(Reg),             // EX9E
    IfKeyNotPressed(Reg),          // EXA1
    SetRegToDelayTimer(Reg),       // FX07
    SetRegToGetKey(Reg),           // FX0A
    SetDelayTimerToReg(Reg),       // FX15
    SetSoundTimerToReg(Reg),       // FX18
    AddRegToI(Reg),                // FX1E
    SetIToSpriteAddrVx(Reg),       // FX29
    SetIToBcdOfReg(Reg),           // FX33
    RegDump(Reg),                  // FX55
    RegLoad(Reg),                  // FX65
}

impl Instruction {
    /// Decode a raw opcode.
    pub fn from_u16(value: u16) -> Result<Instruction, Fault> {
        decoder::decode(value).map(|decoded| decoded.instruction())
    }

    /// Decode an opcode stored as two bytes, most significant first.
    pub fn from_two_u8(left: u8, right: u8) -> Result<Instruction, Fault> {
        Self::from_u16(BitSplitter::new(left, right).as_u16())
    }

    /// Build the typed instruction for a family from its extracted operands.
    /// `operands` must hold as many values as the family's table entry declares.
    pub(crate) fn from_operands(mnemonic: Mnemonic, operands: &[u16]) -> Instruction {
        let reg = |i: usize| Reg(operands[i] as u8);
        let constant = |i: usize| Const(operands[i] as u8);
        let addr = |i: usize| Addr(operands[i]);
        match mnemonic {
            Mnemonic::Sys => Instruction::MachineCall(addr(0)),
            Mnemonic::Cls => Instruction::ClearScreen,
            Mnemonic::Ret => Instruction::Return,
            Mnemonic::JpAddr => Instruction::Goto(addr(0)),
            Mnemonic::CallAddr => Instruction::Call(addr(0)),
            Mnemonic::SeVxByte => Instruction::IfRegEqConst(reg(0), constant(1)),
            Mnemonic::SneVxByte => Instruction::IfRegNeqConst(reg(0), constant(1)),
            Mnemonic::SeVxVy => Instruction::IfRegEqReg(reg(0), reg(1)),
            Mnemonic::LdVxByte => Instruction::SetRegToConst(reg(0), constant(1)),
            Mnemonic::AddVxByte => Instruction::IncRegByConst(reg(0), constant(1)),
            Mnemonic::LdVxVy => Instruction::SetRegToReg(reg(0), reg(1)),
            Mnemonic::OrVxVy => Instruction::BitwiseOr(reg(0), reg(1)),
            Mnemonic::AndVxVy => Instruction::BitwiseAnd(reg(0), reg(1)),
            Mnemonic::XorVxVy => Instruction::BitwiseXor(reg(0), reg(1)),
            Mnemonic::AddVxVy => Instruction::IncRegByReg(reg(0), reg(1)),
            Mnemonic::SubVxVy => Instruction::DecRegByReg(reg(0), reg(1)),
            Mnemonic::ShrVx => Instruction::BitshiftRight(reg(0)),
            Mnemonic::SubnVxVy => Instruction::SetVxVyMinusVx(reg(0), reg(1)),
            Mnemonic::ShlVx => Instruction::BitshiftLeft(reg(0)),
            Mnemonic::SneVxVy => Instruction::IfRegNeqReg(reg(0), reg(1)),
            Mnemonic::LdIAddr => Instruction::SetI(addr(0)),
            Mnemonic::JpV0Addr => Instruction::SetPcToV0PlusAddr(addr(0)),
            Mnemonic::RndVxByte => Instruction::SetVxRand(reg(0), constant(1)),
            Mnemonic::DrwVxVyNibble => Instruction::Draw(reg(0), reg(1), constant(2)),
            Mnemonic::SkpVx => Instruction::IfKeyPressed(reg(0)),
            Mnemonic::SknpVx => Instruction::IfKeyNotPressed(reg(0)),
            Mnemonic::LdVxDt => Instruction::SetRegToDelayTimer(reg(0)),
            Mnemonic::LdVxK => Instruction::SetRegToGetKey(reg(0)),
            Mnemonic::LdDtVx => Instruction::SetDelayTimerToReg(reg(0)),
            Mnemonic::LdStVx => Instruction::SetSoundTimerToReg(reg(0)),
            Mnemonic::AddIVx => Instruction::AddRegToI(reg(0)),
            Mnemonic::LdFVx => Instruction::SetIToSpriteAddrVx(reg(0)),
            Mnemonic::LdBVx => Instruction::SetIToBcdOfReg(reg(0)),
            Mnemonic::LdMemVx => Instruction::RegDump(reg(0)),
            Mnemonic::LdVxMem => Instruction::RegLoad(reg(0)),
        }
    }

    /// The family this instruction belongs to.
    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            Instruction::MachineCall(_) => Mnemonic::Sys,
            Instruction::ClearScreen => Mnemonic::Cls,
            Instruction::Return => Mnemonic::Ret,
            Instruction::Goto(_) => Mnemonic::JpAddr,
            Instruction::Call(_) => Mnemonic::CallAddr,
            Instruction::IfRegEqConst(..) => Mnemonic::SeVxByte,
            Instruction::IfRegNeqConst(..) => Mnemonic::SneVxByte,
            Instruction::IfRegEqReg(..) => Mnemonic::SeVxVy,
            Instruction::SetRegToConst(..) => Mnemonic::LdVxByte,
            Instruction::IncRegByConst(..) => Mnemonic::AddVxByte,
            Instruction::SetRegToReg(..) => Mnemonic::LdVxVy,
            Instruction::BitwiseOr(..) => Mnemonic::OrVxVy,
            Instruction::BitwiseAnd(..) => Mnemonic::AndVxVy,
            Instruction::BitwiseXor(..) => Mnemonic::XorVxVy,
            Instruction::IncRegByReg(..) => Mnemonic::AddVxVy,
            Instruction::DecRegByReg(..) => Mnemonic::SubVxVy,
            Instruction::BitshiftRight(_) => Mnemonic::ShrVx,
            Instruction::SetVxVyMinusVx(..) => Mnemonic::SubnVxVy,
            Instruction::BitshiftLeft(_) => Mnemonic::ShlVx,
            Instruction::IfRegNeqReg(..) => Mnemonic::SneVxVy,
            Instruction::SetI(_) => Mnemonic::LdIAddr,
            Instruction::SetPcToV0PlusAddr(_) => Mnemonic::JpV0Addr,
            Instruction::SetVxRand(..) => Mnemonic::RndVxByte,
            Instruction::Draw(..) => Mnemonic::DrwVxVyNibble,
            Instruction::IfKeyPressed(_) => Mnemonic::SkpVx,
            Instruction::IfKeyNotPressed(_) => Mnemonic::SknpVx,
            Instruction::SetRegToDelayTimer(_) => Mnemonic::LdVxDt,
            Instruction::SetRegToGetKey(_) => Mnemonic::LdVxK,
            Instruction::SetDelayTimerToReg(_) => Mnemonic::LdDtVx,
            Instruction::SetSoundTimerToReg(_) => Mnemonic::LdStVx,
            Instruction::AddRegToI(_) => Mnemonic::AddIVx,
            Instruction::SetIToSpriteAddrVx(_) => Mnemonic::LdFVx,
            Instruction::SetIToBcdOfReg(_) => Mnemonic::LdBVx,
            Instruction::RegDump(_) => Mnemonic::LdMemVx,
            Instruction::RegLoad(_) => Mnemonic::LdVxMem,
        }
    }

    /// Encode the instruction back into an opcode.
    /// Operands wider than their field are truncated to it.
    pub fn to_u16(&self) -> u16 {
        let x = |Reg(r): Reg| (r as u16 & 0xF) << 8;
        let y = |Reg(r): Reg| (r as u16 & 0xF) << 4;
        let kk = |Const(c): Const| c as u16;
        let nnn = |Addr(a): Addr| a & 0x0FFF;
        match *self {
            Instruction::MachineCall(a) => nnn(a),
            Instruction::ClearScreen => 0x00E0,
            Instruction::Return => 0x00EE,
            Instruction::Goto(a) => 0x1000 | nnn(a),
            Instruction::Call(a) => 0x2000 | nnn(a),
            Instruction::IfRegEqConst(r, c) => 0x3000 | x(r) | kk(c),
            Instruction::IfRegNeqConst(r, c) => 0x4000 | x(r) | kk(c),
            Instruction::IfRegEqReg(r, s) => 0x5000 | x(r) | y(s),
            Instruction::SetRegToConst(r, c) => 0x6000 | x(r) | kk(c),
            Instruction::IncRegByConst(r, c) => 0x7000 | x(r) | kk(c),
            Instruction::SetRegToReg(r, s) => 0x8000 | x(r) | y(s),
            Instruction::BitwiseOr(r, s) => 0x8001 | x(r) | y(s),
            Instruction::BitwiseAnd(r, s) => 0x8002 | x(r) | y(s),
            Instruction::BitwiseXor(r, s) => 0x8003 | x(r) | y(s),
            Instruction::IncRegByReg(r, s) => 0x8004 | x(r) | y(s),
            Instruction::DecRegByReg(r, s) => 0x8005 | x(r) | y(s),
            Instruction::BitshiftRight(r) => 0x8006 | x(r),
            Instruction::SetVxVyMinusVx(r, s) => 0x8007 | x(r) | y(s),
            Instruction::BitshiftLeft(r) => 0x800E | x(r),
            Instruction::IfRegNeqReg(r, s) => 0x9000 | x(r) | y(s),
            Instruction::SetI(a) => 0xA000 | nnn(a),
            Instruction::SetPcToV0PlusAddr(a) => 0xB000 | nnn(a),
            Instruction::SetVxRand(r, c) => 0xC000 | x(r) | kk(c),
            Instruction::Draw(r, s, Const(n)) => 0xD000 | x(r) | y(s) | (n as u16 & 0xF),
            Instruction::IfKeyPressed(r) => 0xE09E | x(r),
            Instruction::IfKeyNotPressed(r) => 0xE0A1 | x(r),
            Instruction::SetRegToDelayTimer(r) => 0xF007 | x(r),
            Instruction::SetRegToGetKey(r) => 0xF00A | x(r),
            Instruction::SetDelayTimerToReg(r) => 0xF015 | x(r),
            Instruction::SetSoundTimerToReg(r) => 0xF018 | x(r),
            Instruction::AddRegToI(r) => 0xF01E | x(r),
            Instruction::SetIToSpriteAddrVx(r) => 0xF029 | x(r),
            Instruction::SetIToBcdOfReg(r) => 0xF033 | x(r),
            Instruction::RegDump(r) => 0xF055 | x(r),
            Instruction::RegLoad(r) => 0xF065 | x(r),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::MachineCall(a) => write!(f, "SYS {}", a),
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Goto(a) => write!(f, "JP {}", a),
            Instruction::Call(a) => write!(f, "CALL {}", a),
            Instruction::IfRegEqConst(x, c) => write!(f, "SE {}, {}", x, c),
            Instruction::IfRegNeqConst(x, c) => write!(f, "SNE {}, {}", x, c),
            Instruction::IfRegEqReg(x, y) => write!(f, "SE {}, {}", x, y),
            Instruction::SetRegToConst(x, c) => write!(f, "LD {}, {}", x, c),
            Instruction::IncRegByConst(x, c) => write!(f, "ADD {}, {}", x, c),
            Instruction::SetRegToReg(x, y) => write!(f, "LD {}, {}", x, y),
            Instruction::BitwiseOr(x, y) => write!(f, "OR {}, {}", x, y),
            Instruction::BitwiseAnd(x, y) => write!(f, "AND {}, {}", x, y),
            Instruction::BitwiseXor(x, y) => write!(f, "XOR {}, {}", x, y),
            Instruction::IncRegByReg(x, y) => write!(f, "ADD {}, {}", x, y),
            Instruction::DecRegByReg(x, y) => write!(f, "SUB {}, {}", x, y),
            Instruction::BitshiftRight(x) => write!(f, "SHR {}", x),
            Instruction::SetVxVyMinusVx(x, y) => write!(f, "SUBN {}, {}", x, y),
            Instruction::BitshiftLeft(x) => write!(f, "SHL {}", x),
            Instruction::IfRegNeqReg(x, y) => write!(f, "SNE {}, {}", x, y),
            Instruction::SetI(a) => write!(f, "LD I, {}", a),
            Instruction::SetPcToV0PlusAddr(a) => write!(f, "JP V0, {}", a),
            Instruction::SetVxRand(x, c) => write!(f, "RND {}, {}", x, c),
            Instruction::Draw(x, y, Const(n)) => write!(f, "DRW {}, {}, {}", x, y, n),
            Instruction::IfKeyPressed(x) => write!(f, "SKP {}", x),
            Instruction::IfKeyNotPressed(x) => write!(f, "SKNP {}", x),
            Instruction::SetRegToDelayTimer(x) => write!(f, "LD {}, DT", x),
            Instruction::SetRegToGetKey(x) => write!(f, "LD {}, K", x),
            Instruction::SetDelayTimerToReg(x) => write!(f, "LD DT, {}", x),
            Instruction::SetSoundTimerToReg(x) => write!(f, "LD ST, {}", x),
            Instruction::AddRegToI(x) => write!(f, "ADD I, {}", x),
            Instruction::SetIToSpriteAddrVx(x) => write!(f, "LD F, {}", x),
            Instruction::SetIToBcdOfReg(x) => write!(f, "LD B, {}", x),
            Instruction::RegDump(x) => write!(f, "LD [I], {}", x),
            Instruction::RegLoad(x) => write!(f, "LD {}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn opcodes_are_parsed_correctly() {
        assert_eq!(Ok(Instruction::ClearScreen), Instruction::from_u16(0x00E0));
        assert_eq!(Ok(Instruction::Return), Instruction::from_u16(0x00EE));
        assert_eq!(Ok(Instruction::MachineCall(Addr(0x123))), Instruction::from_u16(0x0123));
        assert_eq!(Ok(Instruction::Goto(Addr(0x25))), Instruction::from_u16(0x1025));
        assert_eq!(Ok(Instruction::Call(Addr(0x37))), Instruction::from_u16(0x2037));
        assert_eq!(
            Ok(Instruction::IfRegEqConst(Reg(0xA), Const(8))),
            Instruction::from_u16(0x3A08)
        );
        assert_eq!(
            Ok(Instruction::IfRegNeqConst(Reg(0xA), Const(8))),
            Instruction::from_u16(0x4A08)
        );
        assert_eq!(Ok(Instruction::IfRegEqReg(Reg(0xA), Reg(0xB))), Instruction::from_u16(0x5AB0));
        assert_eq!(
            Ok(Instruction::SetRegToConst(Reg(0xB), Const(0x23))),
            Instruction::from_u16(0x6B23)
        );
        assert_eq!(
            Ok(Instruction::IncRegByConst(Reg(0xC), Const(0xA1))),
            Instruction::from_u16(0x7CA1)
        );
        assert_eq!(Ok(Instruction::SetRegToReg(Reg(0xA), Reg(0xB))), Instruction::from_u16(0x8AB0));
        assert_eq!(Ok(Instruction::BitwiseOr(Reg(0xD), Reg(0xE))), Instruction::from_u16(0x8DE1));
        assert_eq!(Ok(Instruction::BitwiseAnd(Reg(0xD), Reg(0xE))), Instruction::from_u16(0x8DE2));
        assert_eq!(Ok(Instruction::BitwiseXor(Reg(0xD), Reg(0xE))), Instruction::from_u16(0x8DE3));
        assert_eq!(Ok(Instruction::IncRegByReg(Reg(0xA), Reg(0xB))), Instruction::from_u16(0x8AB4));
        assert_eq!(Ok(Instruction::DecRegByReg(Reg(0xA), Reg(0xB))), Instruction::from_u16(0x8AB5));
        assert_eq!(Ok(Instruction::BitshiftRight(Reg(0xA))), Instruction::from_u16(0x8AB6));
        assert_eq!(
            Ok(Instruction::SetVxVyMinusVx(Reg(0xA), Reg(0xB))),
            Instruction::from_u16(0x8AB7)
        );
        assert_eq!(Ok(Instruction::BitshiftLeft(Reg(0xA))), Instruction::from_u16(0x8A0E));
        assert_eq!(Ok(Instruction::IfRegNeqReg(Reg(0xA), Reg(0xB))), Instruction::from_u16(0x9AB0));
        assert_eq!(Ok(Instruction::SetI(Addr(0x25))), Instruction::from_u16(0xA025));
        assert_eq!(Ok(Instruction::SetPcToV0PlusAddr(Addr(0x25))), Instruction::from_u16(0xB025));
        assert_eq!(
            Ok(Instruction::SetVxRand(Reg(0xA), Const(0x23))),
            Instruction::from_u16(0xCA23)
        );
        assert_eq!(
            Ok(Instruction::Draw(Reg(0xA), Reg(0xB), Const(0xC))),
            Instruction::from_u16(0xDABC)
        );
        assert_eq!(Ok(Instruction::IfKeyPressed(Reg(0xA))), Instruction::from_u16(0xEA9E));
        assert_eq!(Ok(Instruction::IfKeyNotPressed(Reg(0xA))), Instruction::from_u16(0xEAA1));
        assert_eq!(Ok(Instruction::SetRegToDelayTimer(Reg(0xA))), Instruction::from_u16(0xFA07));
        assert_eq!(Ok(Instruction::SetRegToGetKey(Reg(0xA))), Instruction::from_u16(0xFA0A));
        assert_eq!(Ok(Instruction::SetDelayTimerToReg(Reg(0xA))), Instruction::from_u16(0xFA15));
        assert_eq!(Ok(Instruction::SetSoundTimerToReg(Reg(0xA))), Instruction::from_u16(0xFA18));
        assert_eq!(Ok(Instruction::AddRegToI(Reg(0xA))), Instruction::from_u16(0xFA1E));
        assert_eq!(Ok(Instruction::SetIToSpriteAddrVx(Reg(0xA))), Instruction::from_u16(0xFA29));
        assert_eq!(Ok(Instruction::SetIToBcdOfReg(Reg(0xA))), Instruction::from_u16(0xFA33));
        assert_eq!(Ok(Instruction::RegDump(Reg(0xA))), Instruction::from_u16(0xFA55));
        assert_eq!(Ok(Instruction::RegLoad(Reg(0xA))), Instruction::from_u16(0xFA65));
    }

    #[test]
    fn from_two_u8_equals_from_u16() {
        assert_eq!(Instruction::from_two_u8(0x12, 0x34), Instruction::from_u16(0x1234));
        assert_eq!(Instruction::from_two_u8(0x2F, 0x2F), Instruction::from_u16(0x2F2F));
        assert_eq!(Instruction::from_two_u8(0x10, 0x20), Instruction::from_u16(0x1020));
    }

    #[test]
    fn table_has_every_mnemonic_once() {
        let mnemonics: HashSet<Mnemonic> = all_specs().map(|spec| spec.mnemonic).collect();
        assert_eq!(mnemonics.len(), 35);
        assert_eq!(all_specs().count(), 35);
    }

    #[test]
    fn families_are_indexed_by_high_nibble() {
        for (nibble, family) in INSTRUCTION_TABLE.iter().enumerate() {
            assert!(!family.is_empty());
            for spec in family.iter() {
                assert_eq!(
                    spec.mask & 0xF000,
                    0xF000,
                    "{} must fix the high nibble",
                    spec.mnemonic
                );
                assert_eq!(
                    (spec.pattern >> 12) as usize,
                    nibble,
                    "{} is in the wrong family",
                    spec.mnemonic
                );
                assert_eq!(
                    spec.pattern & !spec.mask,
                    0,
                    "{} has bits outside its mask",
                    spec.mnemonic
                );
            }
        }
    }

    #[test]
    fn operand_fields_do_not_overlap_fixed_bits() {
        for spec in all_specs() {
            for field in spec.operands {
                assert_eq!(
                    field.mask & spec.mask,
                    0,
                    "{} operand overlaps its pattern",
                    spec.mnemonic
                );
                assert_eq!(field.mask >> field.shift << field.shift, field.mask);
            }
        }
    }

    #[test]
    fn no_entry_is_shadowed_by_an_earlier_one() {
        let specs: Vec<&InstructionSpec> = all_specs().collect();
        for (j, later) in specs.iter().enumerate() {
            for earlier in &specs[..j] {
                // `earlier` claims every opcode of `later` when its fixed bits
                // are a subset of `later`'s and agree with `later`'s pattern.
                let subset = earlier.mask & later.mask == earlier.mask;
                let shadowed = subset && later.pattern & earlier.mask == earlier.pattern;
                assert!(!shadowed, "{} is shadowed by {}", later.mnemonic, earlier.mnemonic);
            }
        }
    }

    #[test]
    fn narrower_entries_come_first_when_patterns_collide() {
        let specs: Vec<&InstructionSpec> = all_specs().collect();
        for (j, later) in specs.iter().enumerate() {
            for earlier in &specs[..j] {
                let common = earlier.mask & later.mask;
                let overlap = earlier.pattern & common == later.pattern & common;
                if overlap {
                    assert!(
                        earlier.fixed_bits() > later.fixed_bits(),
                        "{} overlaps {} but is not narrower",
                        earlier.mnemonic,
                        later.mnemonic
                    );
                }
            }
        }
    }

    #[test]
    fn display_is_assembly() {
        assert_eq!(Instruction::SetRegToConst(Reg(0), Const(5)).to_string(), "LD V0, 0x05");
        assert_eq!(Instruction::Draw(Reg(0xA), Reg(0xB), Const(5)).to_string(), "DRW VA, VB, 5");
        assert_eq!(Instruction::Goto(Addr(0x200)).to_string(), "JP 0x200");
        assert_eq!(Instruction::RegDump(Reg(3)).to_string(), "LD [I], V3");
        assert_eq!(Instruction::RegLoad(Reg(3)).to_string(), "LD V3, [I]");
    }

    proptest! {
        #[test]
        fn encoding_then_decoding_is_identity(opcode in any::<u16>()) {
            if let Ok(instruction) = Instruction::from_u16(opcode) {
                let reencoded = instruction.to_u16();
                prop_assert_eq!(Instruction::from_u16(reencoded), Ok(instruction));
                prop_assert_eq!(
                    instruction.mnemonic(),
                    decoder::decode(opcode).unwrap().mnemonic()
                );
            }
        }
    }
}
