//! Instruction semantics (C5): one handler per 4004 opcode, grouped into
//! submodules by instruction class.
//!
//! [`decode_operands`] turns a fetched opcode byte (plus an optional second
//! byte) into a typed [`Operands`] value; [`execute`] dispatches it to the
//! handler for its mnemonic and reports whether the handler already moved
//! the program counter.

mod accumulator_carry;
mod index_rom;
mod memory_io;
mod subroutine_control;

use crate::error::ProcessorError;
use crate::opcode::{Mnemonic, OpcodeInfo, OperandShape};
use crate::processor::Processor;

/// A fetched opcode's operands, parsed per the 4004's byte-pattern rules:
/// register number is the low 4 bits; pair number is bits 1..3 shifted
/// right by one; condition mask is the low 4 bits; a 12-bit address is the
/// opcode's low 4 bits concatenated with the second byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    Register(u8),
    RegisterPair(u8),
    RegisterPairData8(u8, u8),
    Data4(u8),
    ConditionAddress8(u8, u8),
    RegisterAddress8(u8, u8),
    Address12(u16),
}

/// Whether a handler already overwrote the program counter (a jump, call,
/// or return) or left it for the caller to advance by the instruction's
/// word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    FallThrough,
    Jumped,
}

/// Parses `info`'s operand shape out of `opcode_byte`/`second_byte`.
pub fn decode_operands(info: &OpcodeInfo, opcode_byte: u8, second_byte: Option<u8>) -> Operands {
    let low = opcode_byte & 0x0F;
    match info.operand_shape {
        OperandShape::None => Operands::None,
        OperandShape::Register => Operands::Register(low),
        OperandShape::RegisterPair => Operands::RegisterPair(low >> 1),
        OperandShape::RegisterPairData8 => {
            Operands::RegisterPairData8(low >> 1, second_byte.unwrap_or(0))
        }
        OperandShape::Data4 => Operands::Data4(low),
        OperandShape::ConditionAddress8 => {
            Operands::ConditionAddress8(low, second_byte.unwrap_or(0))
        }
        OperandShape::RegisterAddress8 => {
            Operands::RegisterAddress8(low, second_byte.unwrap_or(0))
        }
        OperandShape::Address12 => {
            let high = (low as u16) << 8;
            Operands::Address12(high | second_byte.unwrap_or(0) as u16)
        }
    }
}

/// Executes one decoded instruction against `processor`.
pub fn execute(
    processor: &mut Processor,
    info: &OpcodeInfo,
    operands: Operands,
) -> Result<ControlFlow, ProcessorError> {
    use Mnemonic::*;
    match info.mnemonic {
        Nop | Ldm | Ld | Xch | Add | Sub | Inc | Clb | Clc | Cmc | Stc | Cma | Iac | Dac | Ral
        | Rar | Tcc | Daa | Tcs | Kbp | Dcl => {
            accumulator_carry::execute(processor, info.mnemonic, operands)
        }
        Fim | Fin | Jin | Src => index_rom::execute(processor, info.mnemonic, operands),
        Jun | Jms | Bbl | Jcn | Isz => {
            subroutine_control::execute(processor, info.mnemonic, operands)
        }
        Wrm | Wr0 | Wr1 | Wr2 | Wr3 | Rdm | Rd0 | Rd1 | Rd2 | Rd3 | Adm | Sbm | Wmp | Wrr
        | Rdr | Wpm => memory_io::execute(processor, info.mnemonic, operands),
        Invalid => Err(ProcessorError::InvalidOpcode(info.opcode)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;

    #[test]
    fn decodes_register_operand_from_low_nibble() {
        let info = opcode::lookup(0xA7); // ld 7
        let operands = decode_operands(info, 0xA7, None);
        assert_eq!(operands, Operands::Register(7));
    }

    #[test]
    fn decodes_register_pair_shifted_right_by_one() {
        let info = opcode::lookup(0x25); // src pair 2 (low nibble 0101)
        let operands = decode_operands(info, 0x25, None);
        assert_eq!(operands, Operands::RegisterPair(2));
    }

    #[test]
    fn decodes_twelve_bit_address_across_both_bytes() {
        let info = opcode::lookup(0x43); // jun high nibble 0x3
        let operands = decode_operands(info, 0x43, Some(0x12));
        assert_eq!(operands, Operands::Address12(0x312));
    }
}
