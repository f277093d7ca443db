//! Static opcode table (C2): one entry per possible first-byte value,
//! covering all 256 cases. A nibble-keyed decode (`classify`) builds the
//! table once into a flat array rather than returning an `Option` per
//! lookup, since the 4004's encoding leaves only two byte values
//! (`0xFE`, `0xFF`) undefined.

use std::sync::OnceLock;

/// The pseudo-opcode the assembler and engine use to mark end-of-program.
/// It cannot appear as a real first-byte value (those only go up to 255),
/// which is exactly why it is safe to reserve as a sentinel.
pub const END_OF_PROGRAM: u16 = 256;

pub const PAGE_SIZE: u16 = 256;
pub const MEMORY_SIZE: u16 = 4096;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Nop,
    Ldm,
    Ld,
    Xch,
    Add,
    Sub,
    Inc,
    Bbl,
    Jin,
    Src,
    Fin,
    Jun,
    Jms,
    Jcn,
    Isz,
    Fim,
    Clb,
    Clc,
    Cmc,
    Stc,
    Cma,
    Iac,
    Dac,
    Ral,
    Rar,
    Tcc,
    Daa,
    Tcs,
    Kbp,
    Dcl,
    Wrm,
    Wmp,
    Wrr,
    Wpm,
    Wr0,
    Wr1,
    Wr2,
    Wr3,
    Rdm,
    Rdr,
    Rd0,
    Rd1,
    Rd2,
    Rd3,
    Adm,
    Sbm,
    /// `0xFE` and `0xFF` carry no instruction on real 4004 silicon.
    Invalid,
}

impl Mnemonic {
    /// The source-text spelling used by the assembler and disassembler.
    pub fn as_str(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Nop => "nop",
            Ldm => "ldm",
            Ld => "ld",
            Xch => "xch",
            Add => "add",
            Sub => "sub",
            Inc => "inc",
            Bbl => "bbl",
            Jin => "jin",
            Src => "src",
            Fin => "fin",
            Jun => "jun",
            Jms => "jms",
            Jcn => "jcn",
            Isz => "isz",
            Fim => "fim",
            Clb => "clb",
            Clc => "clc",
            Cmc => "cmc",
            Stc => "stc",
            Cma => "cma",
            Iac => "iac",
            Dac => "dac",
            Ral => "ral",
            Rar => "rar",
            Tcc => "tcc",
            Daa => "daa",
            Tcs => "tcs",
            Kbp => "kbp",
            Dcl => "dcl",
            Wrm => "wrm",
            Wmp => "wmp",
            Wrr => "wrr",
            Wpm => "wpm",
            Wr0 => "wr0",
            Wr1 => "wr1",
            Wr2 => "wr2",
            Wr3 => "wr3",
            Rdm => "rdm",
            Rdr => "rdr",
            Rd0 => "rd0",
            Rd1 => "rd1",
            Rd2 => "rd2",
            Rd3 => "rd3",
            Adm => "adm",
            Sbm => "sbm",
            Invalid => "???",
        }
    }

    pub fn from_str(s: &str) -> Option<Mnemonic> {
        use Mnemonic::*;
        Some(match s {
            "nop" => Nop,
            "ldm" => Ldm,
            "ld" => Ld,
            "xch" => Xch,
            "add" => Add,
            "sub" => Sub,
            "inc" => Inc,
            "bbl" => Bbl,
            "jin" => Jin,
            "src" => Src,
            "fin" => Fin,
            "jun" => Jun,
            "jms" => Jms,
            "jcn" => Jcn,
            "isz" => Isz,
            "fim" => Fim,
            "clb" => Clb,
            "clc" => Clc,
            "cmc" => Cmc,
            "stc" => Stc,
            "cma" => Cma,
            "iac" => Iac,
            "dac" => Dac,
            "ral" => Ral,
            "rar" => Rar,
            "tcc" => Tcc,
            "daa" => Daa,
            "tcs" => Tcs,
            "kbp" => Kbp,
            "dcl" => Dcl,
            "wrm" => Wrm,
            "wmp" => Wmp,
            "wrr" => Wrr,
            "wpm" => Wpm,
            "wr0" => Wr0,
            "wr1" => Wr1,
            "wr2" => Wr2,
            "wr3" => Wr3,
            "rdm" => Rdm,
            "rdr" => Rdr,
            "rd0" => Rd0,
            "rd1" => Rd1,
            "rd2" => Rd2,
            "rd3" => Rd3,
            "adm" => Adm,
            "sbm" => Sbm,
            _ => return None,
        })
    }
}

/// The operand shape an opcode's mnemonic template uses. Shared by the
/// assembler (to know how many operands to expect and how to encode them)
/// and the disassembler (to know how to render them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    /// No operand; a single opcode byte fully describes the instruction.
    None,
    /// A 4-bit register index 0..=15 packed in the opcode's low nibble.
    Register,
    /// A 4-bit register-pair index 0..=7 packed in bits 1..=3 of the low
    /// nibble (bit 0 distinguishes `FIN`/`JIN` and `FIM`/`SRC`).
    RegisterPair,
    /// A register pair plus an immediate 8-bit data byte (`FIM`).
    RegisterPairData8,
    /// A 4-bit immediate packed in the opcode's low nibble (`LDM`, `BBL`).
    Data4,
    /// A 4-bit condition mask packed in the low nibble plus an 8-bit
    /// address byte (`JCN`).
    ConditionAddress8,
    /// A register index packed in the low nibble plus an 8-bit address
    /// byte (`ISZ`).
    RegisterAddress8,
    /// A 12-bit address split across the opcode's low nibble (high bits)
    /// and a second byte (low bits) (`JUN`, `JMS`).
    Address12,
}

/// One entry of the 256-row opcode table (C2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// The literal first-byte value this entry describes, 0..=255.
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub operand_shape: OperandShape,
    /// Nominal execution time, in tenths of a microsecond, per the 4004
    /// data sheet's ~10.8us machine cycle. Not cycle-accurate: this is a
    /// fixed per-opcode figure, not a simulation of bus contention or wait
    /// states.
    pub nominal_time_tenths_us: u16,
    /// The fixed high nibble and the low nibble as literally encoded in
    /// `opcode`; kept alongside `opcode` so callers can verify `bits.0 <<
    /// 4 | bits.1 == opcode` without recomputing it.
    pub bits: (u8, u8),
    /// Instruction length in words (bytes): 1 or 2.
    pub word_length: u8,
}

const ONE_WORD_TIME: u16 = 108;
const TWO_WORD_TIME: u16 = 216;

fn classify(opcode: u8) -> (Mnemonic, OperandShape, u16, u8) {
    use Mnemonic::*;
    use OperandShape::*;

    let high = opcode >> 4;
    let low = opcode & 0x0F;

    match high {
        0x0 if low == 0 => (Nop, None, ONE_WORD_TIME, 1),
        0x0 => (Invalid, OperandShape::None, 0, 1),
        0x1 => (Jcn, ConditionAddress8, TWO_WORD_TIME, 2),
        0x2 if low & 1 == 0 => (Fim, RegisterPairData8, TWO_WORD_TIME, 2),
        0x2 => (Src, RegisterPair, ONE_WORD_TIME, 1),
        0x3 if low & 1 == 0 => (Fin, RegisterPair, TWO_WORD_TIME, 1),
        0x3 => (Jin, RegisterPair, ONE_WORD_TIME, 1),
        0x4 => (Jun, Address12, TWO_WORD_TIME, 2),
        0x5 => (Jms, Address12, TWO_WORD_TIME, 2),
        0x6 => (Inc, Register, ONE_WORD_TIME, 1),
        0x7 => (Isz, RegisterAddress8, TWO_WORD_TIME, 2),
        0x8 => (Add, Register, ONE_WORD_TIME, 1),
        0x9 => (Sub, Register, ONE_WORD_TIME, 1),
        0xA => (Ld, Register, ONE_WORD_TIME, 1),
        0xB => (Xch, Register, ONE_WORD_TIME, 1),
        0xC => (Bbl, Data4, ONE_WORD_TIME, 1),
        0xD => (Ldm, Data4, ONE_WORD_TIME, 1),
        0xE => {
            let mnemonic = match low {
                0x0 => Wrm,
                0x1 => Wmp,
                0x2 => Wrr,
                0x3 => Wpm,
                0x4 => Wr0,
                0x5 => Wr1,
                0x6 => Wr2,
                0x7 => Wr3,
                0x8 => Sbm,
                0x9 => Rdm,
                0xA => Rdr,
                0xB => Adm,
                0xC => Rd0,
                0xD => Rd1,
                0xE => Rd2,
                0xF => Rd3,
                _ => unreachable!(),
            };
            (mnemonic, OperandShape::None, ONE_WORD_TIME, 1)
        }
        0xF => match low {
            0x0 => (Clb, OperandShape::None, ONE_WORD_TIME, 1),
            0x1 => (Clc, OperandShape::None, ONE_WORD_TIME, 1),
            0x2 => (Iac, OperandShape::None, ONE_WORD_TIME, 1),
            0x3 => (Cmc, OperandShape::None, ONE_WORD_TIME, 1),
            0x4 => (Cma, OperandShape::None, ONE_WORD_TIME, 1),
            0x5 => (Ral, OperandShape::None, ONE_WORD_TIME, 1),
            0x6 => (Rar, OperandShape::None, ONE_WORD_TIME, 1),
            0x7 => (Tcc, OperandShape::None, ONE_WORD_TIME, 1),
            0x8 => (Dac, OperandShape::None, ONE_WORD_TIME, 1),
            0x9 => (Tcs, OperandShape::None, ONE_WORD_TIME, 1),
            0xA => (Stc, OperandShape::None, ONE_WORD_TIME, 1),
            0xB => (Daa, OperandShape::None, ONE_WORD_TIME, 1),
            0xC => (Kbp, OperandShape::None, ONE_WORD_TIME, 1),
            0xD => (Dcl, OperandShape::None, ONE_WORD_TIME, 1),
            _ => (Invalid, OperandShape::None, 0, 1),
        },
        _ => unreachable!("nibble is always 0..=15"),
    }
}

fn build_table() -> [OpcodeInfo; 256] {
    let mut table = [OpcodeInfo {
        opcode: 0,
        mnemonic: Mnemonic::Invalid,
        operand_shape: OperandShape::None,
        nominal_time_tenths_us: 0,
        bits: (0, 0),
        word_length: 1,
    }; 256];

    for (opcode, slot) in table.iter_mut().enumerate() {
        let opcode = opcode as u8;
        let (mnemonic, operand_shape, nominal_time_tenths_us, word_length) = classify(opcode);
        *slot = OpcodeInfo {
            opcode,
            mnemonic,
            operand_shape,
            nominal_time_tenths_us,
            bits: (opcode >> 4, opcode & 0x0F),
            word_length,
        };
    }

    table
}

static TABLE: OnceLock<[OpcodeInfo; 256]> = OnceLock::new();

/// Returns the full 256-entry opcode table, computing it once.
pub fn table() -> &'static [OpcodeInfo; 256] {
    TABLE.get_or_init(build_table)
}

/// Looks up the table entry for a given first-byte opcode value.
pub fn lookup(opcode: u8) -> &'static OpcodeInfo {
    &table()[opcode as usize]
}

/// Looks up a real (non-`Invalid`) opcode entry by mnemonic and, for
/// mnemonics whose low nibble carries an operand, the operand value
/// needed to pick the right byte (register, pair, or data nibble). Used
/// by the assembler to go from source text back to a byte.
pub fn encode(mnemonic: Mnemonic, operand_low_nibble: u8) -> Option<u8> {
    use Mnemonic::*;
    let high = match mnemonic {
        Nop => return Some(0x00),
        Jcn => 0x1,
        Fim => 0x2,
        Src => 0x2,
        Fin => 0x3,
        Jin => 0x3,
        Jun => 0x4,
        Jms => 0x5,
        Inc => 0x6,
        Isz => 0x7,
        Add => 0x8,
        Sub => 0x9,
        Ld => 0xA,
        Xch => 0xB,
        Bbl => 0xC,
        Ldm => 0xD,
        Wrm | Wmp | Wrr | Wpm | Wr0 | Wr1 | Wr2 | Wr3 | Sbm | Rdm | Rdr | Adm | Rd0 | Rd1
        | Rd2 | Rd3 => 0xE,
        Clb | Clc | Iac | Cmc | Cma | Ral | Rar | Tcc | Dac | Tcs | Stc | Daa | Kbp | Dcl => 0xF,
        Invalid => return None,
    };

    let low = match mnemonic {
        Wrm => 0x0,
        Wmp => 0x1,
        Wrr => 0x2,
        Wpm => 0x3,
        Wr0 => 0x4,
        Wr1 => 0x5,
        Wr2 => 0x6,
        Wr3 => 0x7,
        Sbm => 0x8,
        Rdm => 0x9,
        Rdr => 0xA,
        Adm => 0xB,
        Rd0 => 0xC,
        Rd1 => 0xD,
        Rd2 => 0xE,
        Rd3 => 0xF,
        Clb => 0x0,
        Clc => 0x1,
        Iac => 0x2,
        Cmc => 0x3,
        Cma => 0x4,
        Ral => 0x5,
        Rar => 0x6,
        Tcc => 0x7,
        Dac => 0x8,
        Tcs => 0x9,
        Stc => 0xA,
        Daa => 0xB,
        Kbp => 0xC,
        Dcl => 0xD,
        Src => (operand_low_nibble << 1) | 1,
        Fim => operand_low_nibble << 1,
        Fin => operand_low_nibble << 1,
        Jin => (operand_low_nibble << 1) | 1,
        // Jcn/Isz/Ld/Xch/Add/Sub/Inc/Ldm/Bbl all pack the operand directly
        // into the low nibble with no further shifting.
        _ => operand_low_nibble,
    };

    Some((high << 4) | (low & 0x0F))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_256_entries_matching_their_opcode() {
        let t = table();
        assert_eq!(t.len(), 256);
        for entry in t.iter() {
            assert_eq!(entry.bits.0 << 4 | entry.bits.1, entry.opcode);
        }
    }

    #[test]
    fn only_fe_and_ff_are_invalid() {
        let invalid: Vec<u8> = table()
            .iter()
            .filter(|e| e.mnemonic == Mnemonic::Invalid)
            .map(|e| e.opcode)
            .collect();
        assert_eq!(invalid, vec![0xFE, 0xFF]);
    }

    #[test]
    fn e_group_covers_all_sixteen_mnemonics() {
        let mnemonics: Vec<Mnemonic> = (0xE0..=0xEF).map(|op| lookup(op).mnemonic).collect();
        assert_eq!(mnemonics.len(), 16);
        assert!(mnemonics.contains(&Mnemonic::Wrm));
        assert!(mnemonics.contains(&Mnemonic::Rd3));
    }

    #[test]
    fn mnemonic_round_trips_through_text() {
        for entry in table().iter() {
            if entry.mnemonic == Mnemonic::Invalid {
                continue;
            }
            let text = entry.mnemonic.as_str();
            assert_eq!(Mnemonic::from_str(text), Some(entry.mnemonic));
        }
    }
}
