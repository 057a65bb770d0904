//! Turns raw opcodes into table entries and operands.

use std::fmt;

use crate::emulator::error::Fault;
use crate::emulator::instruction::{Instruction, InstructionSpec, Mnemonic, INSTRUCTION_TABLE};
use crate::util::bit_splitter::BitSplitter;

/// Operands never exceed three (`DRW Vx, Vy, nibble`).
const MAX_OPERANDS: usize = 3;

/// A successfully decoded opcode.
#[derive(Clone, Copy)]
pub struct Decoded {
    opcode: u16,
    spec: &'static InstructionSpec,
    operands: [u16; MAX_OPERANDS],
}

impl Decoded {
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// The table entry that matched.
    pub fn spec(&self) -> &'static InstructionSpec {
        self.spec
    }

    pub fn mnemonic(&self) -> Mnemonic {
        self.spec.mnemonic
    }

    /// Operand values in the order the table entry declares them.
    pub fn operands(&self) -> &[u16] {
        &self.operands[..self.spec.operands.len()]
    }

    pub fn instruction(&self) -> Instruction {
        Instruction::from_operands(self.spec.mnemonic, self.operands())
    }
}

impl fmt::Debug for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoded")
            .field("opcode", &format_args!("{:#06x}", self.opcode))
            .field("mnemonic", &self.spec.mnemonic)
            .field("operands", &self.operands())
            .finish()
    }
}

/// Find the first entry in `specs` whose fixed bits match `opcode`.
pub fn first_match<'a>(specs: &'a [InstructionSpec], opcode: u16) -> Option<&'a InstructionSpec> {
    specs.iter().find(|spec| spec.matches(opcode))
}

/// Decode an opcode, looking only at the family selected by its high nibble.
pub fn decode(opcode: u16) -> Result<Decoded, Fault> {
    let bits = BitSplitter::from_u16(opcode);
    let family = INSTRUCTION_TABLE[bits.high_nibble() as usize];
    let spec = first_match(family, opcode).ok_or(Fault::UnknownOpcode { opcode })?;

    let mut operands = [0; MAX_OPERANDS];
    for (slot, field) in operands.iter_mut().zip(spec.operands) {
        *slot = bits.extract(field.mask, field.shift);
    }

    Ok(Decoded { opcode, spec, operands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::instruction::{all_specs, OperandField};
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(0x00E0, Mnemonic::Cls, &[] ; "clear screen")]
    #[test_case(0x00EE, Mnemonic::Ret, &[] ; "return from call")]
    #[test_case(0x0123, Mnemonic::Sys, &[0x123] ; "machine call")]
    #[test_case(0x1ABC, Mnemonic::JpAddr, &[0xABC] ; "jump")]
    #[test_case(0x2ABC, Mnemonic::CallAddr, &[0xABC] ; "call")]
    #[test_case(0x3A42, Mnemonic::SeVxByte, &[0xA, 0x42] ; "skip equal const")]
    #[test_case(0x5AB0, Mnemonic::SeVxVy, &[0xA, 0xB] ; "skip equal reg")]
    #[test_case(0x8AB6, Mnemonic::ShrVx, &[0xA] ; "shift right ignores y")]
    #[test_case(0x8ABE, Mnemonic::ShlVx, &[0xA] ; "shift left ignores y")]
    #[test_case(0x9AB0, Mnemonic::SneVxVy, &[0xA, 0xB] ; "skip not equal reg")]
    #[test_case(0xB123, Mnemonic::JpV0Addr, &[0x123] ; "jump offset")]
    #[test_case(0xD125, Mnemonic::DrwVxVyNibble, &[0x1, 0x2, 0x5] ; "draw")]
    #[test_case(0xE39E, Mnemonic::SkpVx, &[0x3] ; "skip pressed")]
    #[test_case(0xE3A1, Mnemonic::SknpVx, &[0x3] ; "skip not pressed")]
    #[test_case(0xF30A, Mnemonic::LdVxK, &[0x3] ; "wait for key")]
    #[test_case(0xF355, Mnemonic::LdMemVx, &[0x3] ; "store registers")]
    #[test_case(0xF365, Mnemonic::LdVxMem, &[0x3] ; "load registers")]
    fn decodes(opcode: u16, mnemonic: Mnemonic, operands: &[u16]) {
        let decoded = decode(opcode).unwrap();
        assert_eq!(decoded.mnemonic(), mnemonic);
        assert_eq!(decoded.operands(), operands);
        assert_eq!(decoded.opcode(), opcode);
    }

    #[test_case(0x5AB1 ; "5 family needs low nibble zero")]
    #[test_case(0x8AB8 ; "no 8xy8")]
    #[test_case(0x9AB1 ; "9 family needs low nibble zero")]
    #[test_case(0xE100 ; "no e100")]
    #[test_case(0xF0FF ; "no f0ff")]
    #[test_case(0xFA99 ; "no fx99")]
    fn unknown_opcodes_are_rejected(opcode: u16) {
        assert_eq!(decode(opcode).unwrap_err(), Fault::UnknownOpcode { opcode });
    }

    #[test]
    fn clear_and_return_win_over_machine_call() {
        assert_eq!(decode(0x00E0).unwrap().mnemonic(), Mnemonic::Cls);
        assert_eq!(decode(0x00EE).unwrap().mnemonic(), Mnemonic::Ret);
        assert_eq!(decode(0x00E1).unwrap().mnemonic(), Mnemonic::Sys);
    }

    #[test]
    fn table_order_breaks_ties() {
        static WIDE: &[OperandField] = &[OperandField { mask: 0x0FFF, shift: 0 }];
        let misordered = [
            InstructionSpec {
                mnemonic: Mnemonic::Sys,
                mask: 0xF000,
                pattern: 0x0000,
                operands: WIDE,
            },
            InstructionSpec {
                mnemonic: Mnemonic::Cls,
                mask: 0xFFFF,
                pattern: 0x00E0,
                operands: &[],
            },
        ];
        // A catch-all listed first swallows the narrower entry.
        assert_eq!(first_match(&misordered, 0x00E0).unwrap().mnemonic, Mnemonic::Sys);
        assert_eq!(first_match(INSTRUCTION_TABLE[0], 0x00E0).unwrap().mnemonic, Mnemonic::Cls);
    }

    #[test]
    fn decoded_instruction_is_typed() {
        use crate::emulator::instruction::{Const, Reg};
        let decoded = decode(0x6005).unwrap();
        assert_eq!(decoded.instruction(), Instruction::SetRegToConst(Reg(0), Const(5)));
    }

    fn spec_and_values() -> impl Strategy<Value = (usize, [u16; 3])> {
        (0..all_specs().count(), any::<[u16; 3]>())
    }

    proptest! {
        #[test]
        fn round_trip_recovers_name_and_operands((index, values) in spec_and_values()) {
            let spec = all_specs().nth(index).unwrap();

            let mut opcode = spec.pattern;
            let mut expected = Vec::new();
            for (field, value) in spec.operands.iter().zip(values.iter()) {
                let bits = (*value << field.shift) & field.mask;
                opcode |= bits;
                expected.push(bits >> field.shift);
            }

            let decoded = decode(opcode).unwrap();
            if decoded.mnemonic() == spec.mnemonic {
                prop_assert_eq!(decoded.operands(), &expected[..]);
            } else {
                // Only a narrower entry listed earlier may claim the opcode.
                let specs: Vec<&InstructionSpec> = all_specs().collect();
                let winner = specs.iter().position(|s| s.mnemonic == decoded.mnemonic()).unwrap();
                prop_assert!(winner < index);
                prop_assert!(decoded.spec().fixed_bits() > spec.fixed_bits());
            }
        }
    }
}
