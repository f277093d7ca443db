//! Two-pass assembler (C6): source text to memory image, with label
//! resolution and directive handling.

mod label;

use serde::{Deserialize, Serialize};

use crate::error::{AssemblyError, AssemblyErrorKind};
use crate::opcode::{self, Mnemonic, OperandShape, END_OF_PROGRAM, MEMORY_SIZE};
use crate::processor::Processor;

use label::LabelTable;

/// The memory space a program assembles into, per §6's `location` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Rom,
    Ram,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub label: String,
    pub address: u16,
}

/// The assembler's output record (§6's object module format). `memory`
/// renders each word as a hex string; the sentinel (256) renders as the
/// three-digit string `"100"` since it doesn't fit the usual two hex
/// digits, making it unambiguous on inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectModule {
    pub location: Location,
    pub labels: Vec<LabelEntry>,
    pub memory: Vec<String>,
    pub start_address: u16,
    /// Set when source contains a `pin` directive; applied by
    /// [`ObjectModule::load_into`]. Not one of §6's three named fields, but
    /// the directive has to surface its effect somewhere once assembly
    /// returns a self-contained record instead of a live `Processor`.
    pub pin10: Option<u8>,
}

impl ObjectModule {
    /// Copies `memory` into `processor`'s ROM or RAM starting at
    /// `start_address`, and applies `pin10` if the source set it.
    pub fn load_into(&self, processor: &mut Processor) {
        for (offset, word) in self.memory.iter().enumerate() {
            let value = if word == "100" {
                END_OF_PROGRAM
            } else {
                u16::from_str_radix(word, 16).unwrap_or(0)
            };
            let address = self.start_address as usize + offset;
            match self.location {
                Location::Rom => processor.rom[address] = value,
                Location::Ram => processor.ram[address] = value as u8,
            }
        }
        if let Some(pin) = self.pin10 {
            let _ = processor.write_pin10(pin);
        }
    }
}

#[derive(Debug, Clone)]
enum Line<'a> {
    Blank,
    Comment,
    Org(&'a str),
    End,
    Pin(&'a str),
    Instruction {
        label: Option<&'a str>,
        mnemonic: &'a str,
        operands: Vec<&'a str>,
    },
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    if trimmed.starts_with('/') {
        return Line::Comment;
    }

    let mut rest = trimmed;
    let mut label = None;
    if let Some(first_space) = rest.find(char::is_whitespace) {
        let first_token = &rest[..first_space];
        if let Some(stripped) = first_token.strip_suffix(',') {
            label = Some(stripped);
            rest = rest[first_space..].trim_start();
        }
    }

    let (mnemonic, operand_text) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };

    match mnemonic {
        "org" => return Line::Org(operand_text),
        "end" => return Line::End,
        "pin" => return Line::Pin(operand_text),
        _ => {}
    }

    let operands = if operand_text.is_empty() {
        Vec::new()
    } else {
        operand_text.split(',').map(str::trim).collect()
    };

    Line::Instruction {
        label,
        mnemonic,
        operands,
    }
}

fn word_length_for(mnemonic: &str) -> Option<u8> {
    let m = Mnemonic::from_str(mnemonic)?;
    opcode::table()
        .iter()
        .find(|e| e.mnemonic == m)
        .map(|e| e.word_length)
}

/// Assembles `source` into an [`ObjectModule`].
pub fn assemble(source: &str) -> Result<ObjectModule, AssemblyError> {
    let lines: Vec<&str> = source.lines().collect();

    // Pass 1: resolve every label's address.
    let mut labels = LabelTable::new();
    let mut location: Option<Location> = None;
    let mut address: u16 = 0;
    let mut start_address: u16 = 0;
    let mut seen_org = false;

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        match classify(raw_line) {
            Line::Blank | Line::Comment => {}
            Line::Org(arg) => {
                let (loc, addr) = parse_org(arg)
                    .map_err(|kind| AssemblyError::new(line_no, kind))?;
                location = Some(loc);
                address = addr;
                start_address = addr;
                seen_org = true;
            }
            Line::Pin(_) => {}
            Line::End => {
                address = address
                    .checked_add(1)
                    .ok_or_else(|| AssemblyError::new(line_no, AssemblyErrorKind::AddressSpaceExhausted(address)))?;
            }
            Line::Instruction {
                label,
                mnemonic,
                operands: _,
            } => {
                if !seen_org {
                    return Err(AssemblyError::new(line_no, AssemblyErrorKind::MissingOrg));
                }
                if let Some(label) = label {
                    labels
                        .declare(label, address)
                        .map_err(|kind| AssemblyError::new(line_no, kind))?;
                }
                let words = word_length_for(mnemonic).ok_or_else(|| {
                    AssemblyError::new(line_no, AssemblyErrorKind::UnknownMnemonic(mnemonic.to_string()))
                })?;
                address = address.checked_add(words as u16).ok_or_else(|| {
                    AssemblyError::new(line_no, AssemblyErrorKind::AddressSpaceExhausted(address))
                })?;
                if address as u32 > MEMORY_SIZE as u32 {
                    return Err(AssemblyError::new(
                        line_no,
                        AssemblyErrorKind::AddressSpaceExhausted(address),
                    ));
                }
            }
        }
    }

    let location = location.ok_or_else(|| AssemblyError::new(1, AssemblyErrorKind::MissingOrg))?;

    // Pass 2: emit bytes now that every label has a definitive address.
    let mut memory: Vec<u16> = Vec::new();
    let mut cursor: u16 = start_address;
    let mut pin10 = None;

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        match classify(raw_line) {
            Line::Blank | Line::Comment | Line::Org(_) => {}
            Line::Pin(arg) => {
                pin10 = Some(parse_pin(arg).map_err(|kind| AssemblyError::new(line_no, kind))?);
            }
            Line::End => {
                push_word(&mut memory, &mut cursor, END_OF_PROGRAM);
            }
            Line::Instruction {
                label: _,
                mnemonic,
                operands,
            } => {
                emit_instruction(mnemonic, &operands, &labels, &mut memory, &mut cursor)
                    .map_err(|kind| AssemblyError::new(line_no, kind))?;
            }
        }
    }

    Ok(ObjectModule {
        location,
        labels: labels
            .iter()
            .map(|(label, address)| LabelEntry {
                label: label.to_string(),
                address,
            })
            .collect(),
        memory: memory.iter().map(render_word).collect(),
        start_address,
        pin10,
    })
}

fn render_word(word: &u16) -> String {
    if *word == END_OF_PROGRAM {
        "100".to_string()
    } else {
        format!("{:02X}", word)
    }
}

fn push_word(memory: &mut Vec<u16>, cursor: &mut u16, word: u16) {
    memory.push(word);
    *cursor += 1;
}

fn parse_org(arg: &str) -> Result<(Location, u16), AssemblyErrorKind> {
    match arg {
        "rom" => Ok((Location::Rom, 0)),
        "ram" => Ok((Location::Ram, 0)),
        other => other
            .parse::<u16>()
            .map(|addr| (Location::Ram, addr))
            .map_err(|_| AssemblyErrorKind::InvalidOrgArgument(other.to_string())),
    }
}

fn parse_pin(arg: &str) -> Result<u8, AssemblyErrorKind> {
    match arg {
        "0" => Ok(0),
        "1" => Ok(1),
        other => Err(AssemblyErrorKind::InvalidPinArgument(other.to_string())),
    }
}

fn parse_numeric_operand(operand: &str) -> Option<i64> {
    if let Some(hex) = operand.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else {
        operand.parse::<i64>().ok()
    }
}

/// Resolves a single-value operand: a decimal/hex literal, or a label to
/// look up. Used for register, pair, and data-nibble operands.
fn resolve_value(operand: &str, labels: &LabelTable) -> Result<i64, AssemblyErrorKind> {
    if let Some(v) = parse_numeric_operand(operand) {
        Ok(v)
    } else {
        labels.resolve(operand).map(|a| a as i64)
    }
}

fn emit_instruction(
    mnemonic: &str,
    operands: &[&str],
    labels: &LabelTable,
    memory: &mut Vec<u16>,
    cursor: &mut u16,
) -> Result<(), AssemblyErrorKind> {
    let m = Mnemonic::from_str(mnemonic)
        .ok_or_else(|| AssemblyErrorKind::UnknownMnemonic(mnemonic.to_string()))?;
    let info = opcode::table()
        .iter()
        .find(|e| e.mnemonic == m)
        .expect("every real mnemonic has at least one table entry");

    let expect_operand_count = |expected: u8| -> Result<(), AssemblyErrorKind> {
        if operands.len() as u8 != expected {
            return Err(AssemblyErrorKind::WrongOperandCount {
                mnemonic: mnemonic.to_string(),
                expected,
                got: operands.len() as u8,
            });
        }
        Ok(())
    };

    match info.operand_shape {
        OperandShape::None => {
            expect_operand_count(0)?;
            push_word(memory, cursor, info.opcode as u16);
        }
        OperandShape::Register | OperandShape::Data4 => {
            expect_operand_count(1)?;
            let v = resolve_value(operands[0], labels)?;
            if !(0..=15).contains(&v) {
                return Err(AssemblyErrorKind::OperandOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: v,
                });
            }
            let byte = opcode::encode(m, v as u8)
                .ok_or_else(|| AssemblyErrorKind::InvalidOperand(operands[0].to_string()))?;
            push_word(memory, cursor, byte as u16);
        }
        OperandShape::RegisterPair => {
            expect_operand_count(1)?;
            let v = resolve_value(operands[0], labels)?;
            if !(0..=7).contains(&v) {
                return Err(AssemblyErrorKind::OperandOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: v,
                });
            }
            let byte = opcode::encode(m, v as u8)
                .ok_or_else(|| AssemblyErrorKind::InvalidOperand(operands[0].to_string()))?;
            push_word(memory, cursor, byte as u16);
        }
        OperandShape::RegisterPairData8 => {
            expect_operand_count(2)?;
            let pair = resolve_value(operands[0], labels)?;
            let data = resolve_value(operands[1], labels)?;
            if !(0..=7).contains(&pair) {
                return Err(AssemblyErrorKind::OperandOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: pair,
                });
            }
            if !(0..=255).contains(&data) {
                return Err(AssemblyErrorKind::OperandOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: data,
                });
            }
            let byte = opcode::encode(m, pair as u8)
                .ok_or_else(|| AssemblyErrorKind::InvalidOperand(operands[0].to_string()))?;
            push_word(memory, cursor, byte as u16);
            push_word(memory, cursor, data as u16);
        }
        OperandShape::Address12 => {
            expect_operand_count(1)?;
            let addr = resolve_value(operands[0], labels)?;
            if !(0..=0x0FFF).contains(&addr) {
                return Err(AssemblyErrorKind::OperandOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: addr,
                });
            }
            let addr = addr as u16;
            let high_nibble = (addr >> 8) as u8;
            let byte = opcode::encode(m, high_nibble)
                .ok_or_else(|| AssemblyErrorKind::InvalidOperand(operands[0].to_string()))?;
            push_word(memory, cursor, byte as u16);
            push_word(memory, cursor, (addr & 0x00FF) as u16);
        }
        OperandShape::ConditionAddress8 => {
            expect_operand_count(2)?;
            let mask = parse_condition_letters(operands[0])?;
            let addr = resolve_value(operands[1], labels)?;
            if !(0..=255).contains(&addr) {
                return Err(AssemblyErrorKind::OperandOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: addr,
                });
            }
            let byte = opcode::encode(m, mask)
                .ok_or_else(|| AssemblyErrorKind::InvalidOperand(operands[0].to_string()))?;
            push_word(memory, cursor, byte as u16);
            push_word(memory, cursor, addr as u16);
        }
        OperandShape::RegisterAddress8 => {
            expect_operand_count(2)?;
            let r = resolve_value(operands[0], labels)?;
            let addr = resolve_value(operands[1], labels)?;
            if !(0..=15).contains(&r) {
                return Err(AssemblyErrorKind::OperandOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: r,
                });
            }
            if !(0..=255).contains(&addr) {
                return Err(AssemblyErrorKind::OperandOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: addr,
                });
            }
            let byte = opcode::encode(m, r as u8)
                .ok_or_else(|| AssemblyErrorKind::InvalidOperand(operands[0].to_string()))?;
            push_word(memory, cursor, byte as u16);
            push_word(memory, cursor, addr as u16);
        }
    }
    Ok(())
}

/// Encodes `JCN`'s condition operand: any combination of the letters I, A,
/// C, T, most-significant bit first, in that fixed order regardless of how
/// the letters are ordered in source text.
fn parse_condition_letters(operand: &str) -> Result<u8, AssemblyErrorKind> {
    let mut mask = 0u8;
    for ch in operand.chars() {
        match ch.to_ascii_uppercase() {
            'I' => mask |= 0b1000,
            'A' => mask |= 0b0100,
            'C' => mask |= 0b0010,
            'T' => mask |= 0b0001,
            _ => return Err(AssemblyErrorKind::InvalidConditionLetters(operand.to_string())),
        }
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_simple_program_with_label_and_jump() {
        let module = assemble("org rom\njms sub\nend\nsub, ldm 9\nbbl 1\nend\n").unwrap();
        assert_eq!(module.location, Location::Rom);
        assert_eq!(module.labels, vec![LabelEntry { label: "sub".into(), address: 3 }]);
        assert_eq!(module.memory, vec!["50", "03", "100", "D9", "C1", "100"]);
    }

    #[test]
    fn missing_org_is_an_error() {
        let err = assemble("ldm 5\nend\n").unwrap_err();
        assert_eq!(err.kind, AssemblyErrorKind::MissingOrg);
    }

    #[test]
    fn duplicate_label_is_an_error() {
        let err = assemble("org rom\nloop, nop\nloop, nop\nend\n").unwrap_err();
        assert_eq!(err.kind, AssemblyErrorKind::DuplicateLabel("loop".into()));
    }

    #[test]
    fn jcn_encodes_condition_letters_in_fixed_order() {
        let module = assemble("org rom\njcn ta, target\ntarget, nop\nend\n").unwrap();
        // mask = A(0100) | T(0001) = 0101
        assert_eq!(module.memory[0], "15");
    }

    #[test]
    fn pin_directive_is_captured_for_later_load() {
        let module = assemble("org rom\npin 1\nnop\nend\n").unwrap();
        assert_eq!(module.pin10, Some(1));
    }

    #[test]
    fn object_module_round_trips_through_json() {
        let module = assemble("org rom\nldm 7\nend\n").unwrap();
        let json = serde_json::to_string(&module).unwrap();
        let back: ObjectModule = serde_json::from_str(&json).unwrap();
        assert_eq!(back.memory, module.memory);
    }
}
