//! Accumulator and carry group: `NOP`, `LDM`, `LD`, `XCH`, `ADD`, `SUB`,
//! `INC`, `CLB`, `CLC`, `CMC`, `STC`, `CMA`, `IAC`, `DAC`, `RAL`, `RAR`,
//! `TCC`, `DAA`, `TCS`, `KBP`, `DCL`. None of these touch the program
//! counter beyond its normal word-count advance.

use crate::error::ProcessorError;
use crate::opcode::Mnemonic;
use crate::processor::Processor;

use super::{ControlFlow, Operands};

pub fn execute(
    p: &mut Processor,
    mnemonic: Mnemonic,
    operands: Operands,
) -> Result<ControlFlow, ProcessorError> {
    use Mnemonic::*;
    match mnemonic {
        Nop => {}
        Ldm => {
            let Operands::Data4(d) = operands else {
                unreachable!("ldm always decodes to Data4")
            };
            p.set_accumulator(d)?;
        }
        Ld => {
            let Operands::Register(r) = operands else {
                unreachable!("ld always decodes to Register")
            };
            let v = p.read_register(r)?;
            p.set_accumulator(v)?;
        }
        Xch => {
            let Operands::Register(r) = operands else {
                unreachable!("xch always decodes to Register")
            };
            let old_register = p.read_register(r)?;
            p.acbr = p.acc;
            p.acc = old_register;
            p.insert_register(r, p.acbr)?;
        }
        Add => {
            let Operands::Register(r) = operands else {
                unreachable!("add always decodes to Register")
            };
            let carry_in = p.read_carry() as u8;
            p.acc += p.read_register(r)? + carry_in;
            p.check_overflow();
        }
        Sub => {
            let Operands::Register(r) = operands else {
                unreachable!("sub always decodes to Register")
            };
            let complement = p.ones_complement(p.read_register(r)? as u32, 4)? as u8;
            let complement_carry = p.read_complement_carry() as u8;
            p.acc += complement + complement_carry;
            p.check_overflow();
        }
        Inc => {
            let Operands::Register(r) = operands else {
                unreachable!("inc always decodes to Register")
            };
            p.increment_register(r)?;
        }
        Clb => {
            p.acc = 0;
            p.reset_carry();
        }
        Clc => p.reset_carry(),
        Cmc => {
            if p.read_carry() {
                p.reset_carry();
            } else {
                p.set_carry();
            }
        }
        Stc => p.set_carry(),
        Cma => {
            p.acc = p.ones_complement(p.acc as u32, 4)? as u8;
        }
        Iac => {
            p.acc += 1;
            p.check_overflow();
        }
        Dac => {
            // 4-bit subtract-by-one: add the ones-complement of 1 plus an
            // implicit carry-in of 1, same shape as SUB's borrow handling.
            p.acc += p.ones_complement(1, 4)? as u8 + 1;
            p.check_overflow();
        }
        Ral => {
            let carry_in = p.read_carry() as u8;
            let carry_out = (p.acc & 0b1000) != 0;
            p.acc = ((p.acc << 1) | carry_in) & 0x0F;
            if carry_out {
                p.set_carry();
            } else {
                p.reset_carry();
            }
        }
        Rar => {
            let carry_in = p.read_carry() as u8;
            let carry_out = (p.acc & 0b0001) != 0;
            p.acc = (p.acc >> 1) | (carry_in << 3);
            if carry_out {
                p.set_carry();
            } else {
                p.reset_carry();
            }
        }
        Tcc => {
            p.acc = p.read_carry() as u8;
            p.reset_carry();
        }
        Daa => {
            if p.read_carry() || p.acc > 9 {
                let previously_set = p.read_carry();
                p.acc += 6;
                p.check_overflow();
                if previously_set {
                    p.set_carry();
                }
            }
        }
        Tcs => {
            p.acc = if p.read_carry() { 10 } else { 9 };
            p.reset_carry();
        }
        Kbp => {
            p.acc = match p.acc {
                0 => 0,
                1 => 1,
                2 => 2,
                4 => 3,
                8 => 4,
                _ => 15,
            };
        }
        Dcl => p.select_bank_from_accumulator(),
        _ => unreachable!("dispatched only for this group's mnemonics"),
    }
    Ok(ControlFlow::FallThrough)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Operands;

    #[test]
    fn add_sets_carry_on_overflow() {
        let mut p = Processor::new();
        p.insert_register(0, 15).unwrap();
        p.acc = 15;
        execute(&mut p, Mnemonic::Add, Operands::Register(0)).unwrap();
        assert_eq!(p.acc, 14);
        assert!(p.read_carry());
    }

    #[test]
    fn sub_borrow_clears_carry() {
        let mut p = Processor::new();
        p.insert_register(0, 5).unwrap();
        p.acc = 2;
        p.set_carry();
        execute(&mut p, Mnemonic::Sub, Operands::Register(0)).unwrap();
        // ACC + ones_complement(5,4) + complement(CY) = 2 + 10 + 0 = 12.
        assert_eq!(p.acc, 12);
        assert!(!p.read_carry());
    }

    #[test]
    fn iac_wraps_fifteen_to_zero_with_carry() {
        let mut p = Processor::new();
        p.acc = 15;
        execute(&mut p, Mnemonic::Iac, Operands::None).unwrap();
        assert_eq!(p.acc, 0);
        assert!(p.read_carry());
    }

    #[test]
    fn ral_rotates_carry_through_accumulator() {
        let mut p = Processor::new();
        p.set_carry();
        p.acc = 0;
        execute(&mut p, Mnemonic::Ral, Operands::None).unwrap();
        assert_eq!(p.acc, 1);
        assert!(!p.read_carry());
    }

    #[test]
    fn kbp_maps_single_bit_patterns() {
        let mut p = Processor::new();
        p.acc = 8;
        execute(&mut p, Mnemonic::Kbp, Operands::None).unwrap();
        assert_eq!(p.acc, 4);

        p.acc = 3;
        execute(&mut p, Mnemonic::Kbp, Operands::None).unwrap();
        assert_eq!(p.acc, 15);
    }

    #[test]
    fn dcl_selects_bank_from_low_three_bits() {
        let mut p = Processor::new();
        p.acc = 3;
        execute(&mut p, Mnemonic::Dcl, Operands::None).unwrap();
        assert_eq!(p.current_bank, 3);
        assert_eq!(p.cm_lines, [false, true, true, false]);
    }
}
