//! Execution engine (C7): the fetch-decode-dispatch loop. States
//! `{Fetching, Executing, Halted}` are represented implicitly by
//! [`step`]'s return value and the caller's loop rather than as a named
//! state machine value; fetch and execute fold into one call per step.

use crate::error::ProcessorError;
use crate::instruction::{self, ControlFlow};
use crate::opcode::{self, END_OF_PROGRAM};
use crate::processor::Processor;

/// What happened during one [`step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction executed; PC now points at the next one.
    Continued,
    /// The sentinel opcode was fetched; PC was not advanced past it.
    Halted,
}

/// What a monitor collaborator decides at an instruction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorDecision {
    Continue,
    Halt,
}

/// The single synchronous call the engine makes to a monitor collaborator
/// between instructions: one call per completed instruction, with the
/// collaborator given a read-only view of the processor and a chance to
/// halt execution before the next fetch.
pub trait MonitorHook {
    fn on_boundary(&mut self, processor: &Processor) -> MonitorDecision;
}

/// An opt-in, caller-driven sink for [`Processor::trace_line`], called once
/// per instruction right after fetch and before execution, and pushed to a
/// caller instead of printed unconditionally.
pub trait TraceHook {
    fn on_trace(&mut self, line: &str);
}

/// Fetches, decodes, and dispatches exactly one instruction at `processor.pc`.
pub fn step(processor: &mut Processor) -> Result<StepOutcome, ProcessorError> {
    let first_byte = processor.rom[processor.pc as usize];
    if first_byte == END_OF_PROGRAM {
        return Ok(StepOutcome::Halted);
    }
    if first_byte > 0xFF {
        return Err(ProcessorError::InvalidOpcode(0xFF));
    }
    let opcode_byte = first_byte as u8;
    let info = opcode::lookup(opcode_byte);

    let second_byte = if info.word_length == 2 {
        let cell = processor.rom[(processor.pc as usize + 1) % opcode::MEMORY_SIZE as usize];
        Some(cell as u8)
    } else {
        None
    };

    let operands = instruction::decode_operands(info, opcode_byte, second_byte);
    let control_flow = instruction::execute(processor, info, operands)?;

    if control_flow == ControlFlow::FallThrough {
        processor.increment_pc(info.word_length as u16)?;
    }

    Ok(StepOutcome::Continued)
}

/// Runs `processor` from `start_pc` until halted, calling `monitor` (if
/// given) once between each instruction.
pub fn run(
    processor: &mut Processor,
    start_pc: u16,
    mut monitor: Option<&mut dyn MonitorHook>,
    mut trace: Option<&mut dyn TraceHook>,
) -> Result<(), ProcessorError> {
    processor.pc = start_pc;
    loop {
        if let Some(hook) = trace.as_deref_mut() {
            hook.on_trace(&processor.trace_line());
        }
        match step(processor)? {
            StepOutcome::Halted => return Ok(()),
            StepOutcome::Continued => {
                if let Some(hook) = monitor.as_deref_mut() {
                    if hook.on_boundary(processor) == MonitorDecision::Halt {
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler;

    fn assemble_and_run(source: &str) -> Processor {
        let mut processor = Processor::new();
        let module = assembler::assemble(source).expect("assembly should succeed");
        module.load_into(&mut processor);
        run(&mut processor, 0, None, None).unwrap();
        processor
    }

    struct LineCollector(Vec<String>);

    impl TraceHook for LineCollector {
        fn on_trace(&mut self, line: &str) {
            self.0.push(line.to_string());
        }
    }

    #[test]
    fn trace_hook_receives_one_line_per_fetched_instruction() {
        let mut processor = Processor::new();
        let module = assembler::assemble("org rom\nldm 7\niac\nend\n").unwrap();
        module.load_into(&mut processor);
        let mut collector = LineCollector(Vec::new());
        run(&mut processor, 0, None, Some(&mut collector)).unwrap();
        // ldm 7, iac, end: three fetches before halting.
        assert_eq!(collector.0.len(), 3);
        assert!(collector.0[0].starts_with("PC=$000"));
        assert!(collector.0[1].starts_with("PC=$001"));
    }

    #[test]
    fn scenario_ldm_sets_accumulator_and_advances_pc() {
        let p = assemble_and_run("org rom\nldm 7\nend\n");
        assert_eq!(p.acc, 7);
        assert!(!p.read_carry());
        assert_eq!(p.pc, 2);
    }

    #[test]
    fn scenario_ldm_xch_ldm_add() {
        let p = assemble_and_run("org rom\nldm 5\nxch 3\nldm 2\nadd 3\nend\n");
        assert_eq!(p.acc, 7);
        assert!(!p.read_carry());
        assert_eq!(p.read_register(3).unwrap(), 5);
    }

    #[test]
    fn scenario_ldm_iac_overflows() {
        let p = assemble_and_run("org rom\nldm 15\niac\nend\n");
        assert_eq!(p.acc, 0);
        assert!(p.read_carry());
    }

    #[test]
    fn scenario_stc_ldm_rar() {
        let p = assemble_and_run("org rom\nstc\nldm 0\nrar\nend\n");
        assert_eq!(p.acc, 8);
        assert!(!p.read_carry());
    }

    #[test]
    fn scenario_ldm_dcl_selects_bank() {
        let p = assemble_and_run("org rom\nldm 3\ndcl\nend\n");
        assert_eq!(p.current_bank, 3);
    }

    #[test]
    fn scenario_jms_then_bbl_returns_past_call() {
        let p = assemble_and_run(
            "org rom\njms sub\nend\nsub, ldm 9\nbbl 1\nend\n",
        );
        assert_eq!(p.acc, 1);
        // JMS is 2 words at address 0, so the return address is 2.
        assert_eq!(p.pc, 2);
    }
}
