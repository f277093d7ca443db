//! Disassembler (C8): a linear sweep over a memory space, decoding one
//! instruction per step with the same opcode table the execution engine
//! uses. Labels are not recovered — operands render as plain numbers.

use crate::opcode::{self, OperandShape, END_OF_PROGRAM};

/// One disassembled instruction: the address it starts at, its byte
/// length, and its rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledLine {
    pub address: u16,
    pub word_length: u8,
    pub text: String,
}

/// Disassembles up to `max_words` sixteen-bit cells from `memory` starting
/// at `start`, stopping early at the sentinel.
pub fn disassemble(memory: &[u16], start: u16, max_words: u16) -> Vec<DisassembledLine> {
    let mut lines = Vec::new();
    let mut pc = start as usize;
    let end = (start as u32 + max_words as u32).min(memory.len() as u32) as usize;

    while pc < end {
        let cell = memory[pc];
        if cell == END_OF_PROGRAM {
            lines.push(DisassembledLine {
                address: pc as u16,
                word_length: 1,
                text: "end".to_string(),
            });
            break;
        }
        if cell > 0xFF {
            break;
        }
        let opcode_byte = cell as u8;
        let info = opcode::lookup(opcode_byte);
        let second_byte = if info.word_length == 2 && pc + 1 < memory.len() {
            Some(memory[pc + 1] as u8)
        } else {
            None
        };

        lines.push(DisassembledLine {
            address: pc as u16,
            word_length: info.word_length,
            text: render(opcode_byte, info, second_byte),
        });

        pc += info.word_length as usize;
    }

    lines
}

fn render(
    opcode_byte: u8,
    info: &opcode::OpcodeInfo,
    second_byte: Option<u8>,
) -> String {
    let mnemonic = info.mnemonic.as_str();
    let low = opcode_byte & 0x0F;
    match info.operand_shape {
        OperandShape::None => mnemonic.to_string(),
        OperandShape::Register | OperandShape::Data4 => format!("{mnemonic} {low}"),
        OperandShape::RegisterPair => format!("{mnemonic} {}", low >> 1),
        OperandShape::RegisterPairData8 => {
            format!("{mnemonic} {}, {}", low >> 1, second_byte.unwrap_or(0))
        }
        OperandShape::ConditionAddress8 => {
            format!("{mnemonic} {:#04b}, {}", low, second_byte.unwrap_or(0))
        }
        OperandShape::RegisterAddress8 => {
            format!("{mnemonic} {}, {}", low, second_byte.unwrap_or(0))
        }
        OperandShape::Address12 => {
            let addr = ((low as u16) << 8) | second_byte.unwrap_or(0) as u16;
            format!("{mnemonic} {addr:#05x}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassembles_ldm_and_stops_at_sentinel() {
        let mut memory = [0u16; 16];
        memory[0] = 0xD7; // ldm 7
        memory[1] = END_OF_PROGRAM;
        let lines = disassemble(&memory, 0, 16);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "ldm 7");
        assert_eq!(lines[1].text, "end");
    }

    #[test]
    fn disassembles_two_word_jun_with_resolved_address() {
        let mut memory = [0u16; 16];
        memory[0] = 0x43;
        memory[1] = 0x12;
        memory[2] = END_OF_PROGRAM;
        let lines = disassemble(&memory, 0, 16);
        assert_eq!(lines[0].text, "jun 0x312");
        assert_eq!(lines[0].word_length, 2);
    }
}
