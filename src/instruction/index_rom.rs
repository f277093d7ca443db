//! Index / ROM-fetch group: `FIM`, `FIN`, `JIN`, `SRC`. None of these
//! overwrite the high nibble of PC, so all fall through to the normal
//! word-count advance except where noted.

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
        Fim => {
            let Operands::RegisterPairData8(pair, data) = operands else {
                unreachable!("fim always decodes to RegisterPairData8")
            };
            p.insert_registerpair(pair, data as u16)?;
        }
        Fin => {
            let Operands::RegisterPair(pair) = operands else {
                unreachable!("fin always decodes to RegisterPair")
            };
            // Exception (b): FIN issued at the last byte of a page fetches
            // from the following page, not the current one.
            let page_high = if p.is_end_of_page(p.pc, 1) {
                p.inc_pc_by_page(p.pc)? >> 8
            } else {
                p.pc >> 8
            };
            let r0 = p.read_registerpair(0)?;
            let fetch_address = (page_high << 8) | (r0 & 0x00FF);
            let cell = p.rom[fetch_address as usize];
            if cell > 0xFF {
                return Err(ProcessorError::InvalidOpcode(0xFF));
            }
            p.insert_registerpair(pair, cell)?;
        }
        Jin => {
            let Operands::RegisterPair(pair) = operands else {
                unreachable!("jin always decodes to RegisterPair")
            };
            let low = p.read_registerpair(pair)?;
            p.pc = (p.pc & 0x0F00) | low;
            return Ok(ControlFlow::Jumped);
        }
        Src => {
            let Operands::RegisterPair(pair) = operands else {
                unreachable!("src always decodes to RegisterPair")
            };
            p.command_register = p.read_registerpair(pair)? as u8;
        }
        _ => unreachable!("dispatched only for this group's mnemonics"),
    }
    Ok(ControlFlow::FallThrough)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jin_lands_within_current_page() {
        let mut p = Processor::new();
        p.pc = 0x300;
        p.insert_registerpair(2, 0x12).unwrap();
        execute(&mut p, Mnemonic::Jin, Operands::RegisterPair(2)).unwrap();
        assert_eq!(p.pc, 0x312);
    }

    #[test]
    fn fin_at_page_boundary_fetches_from_next_page() {
        let mut p = Processor::new();
        p.pc = 0x0FF;
        p.rom[0x100] = 0xAB;
        execute(&mut p, Mnemonic::Fin, Operands::RegisterPair(1)).unwrap();
        assert_eq!(p.read_registerpair(1).unwrap(), 0xAB);
    }

    #[test]
    fn src_loads_command_register_from_pair() {
        let mut p = Processor::new();
        p.insert_registerpair(3, 0x5A).unwrap();
        execute(&mut p, Mnemonic::Src, Operands::RegisterPair(3)).unwrap();
        assert_eq!(p.command_register, 0x5A);
    }
}
