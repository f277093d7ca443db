//! Memory and I/O group: `WRM`/`WR0..WR3`, `RDM`/`RD0..RD3`, `ADM`, `SBM`,
//! `WMP`, `WRR`, `RDR`, `WPM`. All require a prior `SRC` that loaded the
//! command register; none of these overwrite PC.

use crate::error::ProcessorError;
use crate::opcode::Mnemonic;
use crate::processor::{CommandRegisterShape, Processor, WpmHalf, STATUS_CHAR_BASE};

use super::{ControlFlow, Operands};

fn data_ram_address(p: &Processor) -> Result<usize, ProcessorError> {
    let (chip, register, address) =
        p.decode_command_register(p.command_register, CommandRegisterShape::DataRamChar)?;
    p.convert_to_absolute_address(p.current_bank, chip, register, address)
}

fn status_char_address(p: &Processor, status_index: u8) -> Result<usize, ProcessorError> {
    let (chip, register, _) = p.decode_command_register(
        p.command_register,
        CommandRegisterShape::DataRamStatusChar,
    )?;
    p.convert_to_absolute_address(
        p.current_bank,
        chip,
        register,
        STATUS_CHAR_BASE + status_index,
    )
}

pub fn execute(
    p: &mut Processor,
    mnemonic: Mnemonic,
    operands: Operands,
) -> Result<ControlFlow, ProcessorError> {
    use Mnemonic::*;
    match mnemonic {
        Wrm => {
            let address = data_ram_address(p)?;
            p.ram[address] = p.acc;
        }
        Wr0 | Wr1 | Wr2 | Wr3 => {
            let address = status_char_address(p, status_index_of(mnemonic))?;
            p.ram[address] = p.acc;
        }
        Rdm => {
            let address = data_ram_address(p)?;
            p.set_accumulator(p.ram[address])?;
        }
        Rd0 | Rd1 | Rd2 | Rd3 => {
            let address = status_char_address(p, status_index_of(mnemonic))?;
            p.set_accumulator(p.ram[address])?;
        }
        Adm => {
            let address = data_ram_address(p)?;
            let carry_in = p.read_carry() as u8;
            p.acc += p.ram[address] + carry_in;
            p.check_overflow();
        }
        Sbm => {
            let address = data_ram_address(p)?;
            let complement = p.ones_complement(p.ram[address] as u32, 4)? as u8;
            let complement_carry = p.read_complement_carry() as u8;
            p.acc += complement + complement_carry;
            p.check_overflow();
        }
        Wmp => {
            let (port, _, _) =
                p.decode_command_register(p.command_register, CommandRegisterShape::RamPort)?;
            p.ram_ports[port as usize % 4][p.current_bank as usize] = p.acc;
        }
        Wrr => {
            let (port, _, _) =
                p.decode_command_register(p.command_register, CommandRegisterShape::RomPort)?;
            p.rom_ports[port as usize] = p.acc;
        }
        Rdr => {
            let (port, _, _) =
                p.decode_command_register(p.command_register, CommandRegisterShape::RomPort)?;
            p.set_accumulator(p.rom_input_ports[port as usize])?;
        }
        Wpm => {
            let address = data_ram_address(p)?;
            let nibble = p.acc & 0x0F;
            match p.wpm_half {
                WpmHalf::Left => p.ram[address] = (p.ram[address] & 0x0F) | (nibble << 4),
                WpmHalf::Right => p.ram[address] = (p.ram[address] & 0xF0) | nibble,
            }
            p.flip_wpm_counter();
        }
        _ => unreachable!("dispatched only for this group's mnemonics"),
    }
    Ok(ControlFlow::FallThrough)
}

fn status_index_of(mnemonic: Mnemonic) -> u8 {
    use Mnemonic::*;
    match mnemonic {
        Wr0 | Rd0 => 0,
        Wr1 | Rd1 => 1,
        Wr2 | Rd2 => 2,
        Wr3 | Rd3 => 3,
        _ => unreachable!("status_index_of called with a non-status mnemonic"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_command_register(p: &mut Processor, cr: u8) {
        p.command_register = cr;
    }

    #[test]
    fn wrm_then_rdm_round_trips_through_ram() {
        let mut p = Processor::new();
        with_command_register(&mut p, 0b01_01_0011);
        p.acc = 9;
        execute(&mut p, Mnemonic::Wrm, Operands::None).unwrap();
        p.acc = 0;
        execute(&mut p, Mnemonic::Rdm, Operands::None).unwrap();
        assert_eq!(p.acc, 9);
    }

    #[test]
    fn wpm_alternates_left_and_right_halves() {
        let mut p = Processor::new();
        with_command_register(&mut p, 0b01_01_0011);
        p.acc = 0xA;
        execute(&mut p, Mnemonic::Wpm, Operands::None).unwrap();
        let address = data_ram_address(&p).unwrap();
        assert_eq!(p.ram[address] & 0xF0, 0xA0);

        p.acc = 0x5;
        execute(&mut p, Mnemonic::Wpm, Operands::None).unwrap();
        assert_eq!(p.ram[address], 0xA5);
    }

    #[test]
    fn rdr_reads_back_whatever_was_set_externally() {
        let mut p = Processor::new();
        with_command_register(&mut p, 0b0101_0000);
        p.write_rom_input_port(5, 7).unwrap();
        execute(&mut p, Mnemonic::Rdr, Operands::None).unwrap();
        assert_eq!(p.acc, 7);
    }
}
