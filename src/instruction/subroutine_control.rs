//! Subroutine / control group: `JUN`, `JMS`, `BBL`, `JCN`, `ISZ`. Every
//! handler here either overwrites PC itself (reporting
//! [`ControlFlow::Jumped`]) or falls through to the caller's normal advance.

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
        Jun => {
            let Operands::Address12(addr) = operands else {
                unreachable!("jun always decodes to Address12")
            };
            p.pc = addr;
            Ok(ControlFlow::Jumped)
        }
        Jms => {
            let Operands::Address12(addr) = operands else {
                unreachable!("jms always decodes to Address12")
            };
            p.write_to_stack(p.pc + 2)?;
            p.pc = addr;
            Ok(ControlFlow::Jumped)
        }
        Bbl => {
            let Operands::Data4(d) = operands else {
                unreachable!("bbl always decodes to Data4")
            };
            p.pc = p.read_from_stack();
            p.set_accumulator(d)?;
            Ok(ControlFlow::Jumped)
        }
        Jcn => {
            let Operands::ConditionAddress8(mask, addr) = operands else {
                unreachable!("jcn always decodes to ConditionAddress8")
            };
            if condition_is_true(p, mask) {
                p.pc = (p.pc & 0x0F00) | addr as u16;
                Ok(ControlFlow::Jumped)
            } else {
                Ok(ControlFlow::FallThrough)
            }
        }
        Isz => {
            let Operands::RegisterAddress8(r, addr) = operands else {
                unreachable!("isz always decodes to RegisterAddress8")
            };
            let result = p.increment_register(r)?;
            if result != 0 {
                p.pc = (p.pc & 0x0F00) | addr as u16;
                Ok(ControlFlow::Jumped)
            } else {
                Ok(ControlFlow::FallThrough)
            }
        }
        _ => unreachable!("dispatched only for this group's mnemonics"),
    }
}

/// `JCN`'s condition mask is `(I, A, C, T)` from most to least significant
/// bit. `I` inverts the sense of the OR of the other three selected terms.
fn condition_is_true(p: &Processor, mask: u8) -> bool {
    let invert = mask & 0b1000 != 0;
    let check_acc_zero = mask & 0b0100 != 0;
    let check_carry = mask & 0b0010 != 0;
    let check_test_pin = mask & 0b0001 != 0;

    let mut selected = false;
    if check_acc_zero {
        selected |= p.acc == 0;
    }
    if check_carry {
        selected |= p.read_carry();
    }
    if check_test_pin {
        selected |= !p.pin10;
    }

    if invert {
        !selected
    } else {
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jms_pushes_return_address_and_jumps() {
        let mut p = Processor::new();
        p.pc = 0x010;
        execute(&mut p, Mnemonic::Jms, Operands::Address12(0x200)).unwrap();
        assert_eq!(p.pc, 0x200);

        execute(&mut p, Mnemonic::Bbl, Operands::Data4(1)).unwrap();
        assert_eq!(p.pc, 0x012);
        assert_eq!(p.acc, 1);
    }

    #[test]
    fn jcn_takes_branch_when_accumulator_is_zero() {
        let mut p = Processor::new();
        p.pc = 0x500;
        p.acc = 0;
        let taken = execute(&mut p, Mnemonic::Jcn, Operands::ConditionAddress8(0b0100, 0x20))
            .unwrap();
        assert_eq!(taken, ControlFlow::Jumped);
        assert_eq!(p.pc, 0x520);
    }

    #[test]
    fn jcn_inverted_condition_skips_branch_when_true() {
        let mut p = Processor::new();
        p.acc = 0;
        let result = execute(
            &mut p,
            Mnemonic::Jcn,
            Operands::ConditionAddress8(0b1100, 0x20),
        )
        .unwrap();
        assert_eq!(result, ControlFlow::FallThrough);
    }

    #[test]
    fn isz_branches_unless_result_is_zero() {
        let mut p = Processor::new();
        p.pc = 0x040;
        p.insert_register(2, 14).unwrap();
        let branched = execute(&mut p, Mnemonic::Isz, Operands::RegisterAddress8(2, 0x10)).unwrap();
        assert_eq!(branched, ControlFlow::Jumped);
        assert_eq!(p.pc, 0x010);

        p.insert_register(2, 15).unwrap();
        let fell_through =
            execute(&mut p, Mnemonic::Isz, Operands::RegisterAddress8(2, 0x10)).unwrap();
        assert_eq!(fell_through, ControlFlow::FallThrough);
    }
}
