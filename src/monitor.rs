//! Monitor/collaborator interfaces (C9): the read-only introspection
//! surface and command contracts an interactive shell sits on top of. The
//! shell's line-reading REPL loop itself is out of scope (§1); this module
//! only defines the data shapes and single-step hook a collaborator needs.

use serde::{Deserialize, Serialize};

use crate::engine::{MonitorDecision, MonitorHook};
use crate::processor::{Processor, ProcessorState};

/// One textual monitor command, per §6's command surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorCommand {
    Registers,
    Register(u8),
    ProgramCounter,
    Accumulator,
    Carry,
    Pin10,
    CommandRegister,
    Stack,
    Ram,
    Pram,
    Rom,
    SetBreakpoint(u16),
    Detach,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl MonitorCommand {
    pub fn parse(line: &str) -> Result<MonitorCommand, UnknownCommand> {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("reg") {
            if let Ok(n) = rest.parse::<u8>() {
                return Ok(MonitorCommand::Register(n));
            }
        }
        if let Some(rest) = trimmed.strip_prefix("b ") {
            if let Ok(addr) = rest.trim().parse::<u16>() {
                return Ok(MonitorCommand::SetBreakpoint(addr));
            }
        }
        match trimmed {
            "regs" => Ok(MonitorCommand::Registers),
            "pc" => Ok(MonitorCommand::ProgramCounter),
            "acc" => Ok(MonitorCommand::Accumulator),
            "carry" => Ok(MonitorCommand::Carry),
            "pin10" => Ok(MonitorCommand::Pin10),
            "crb" => Ok(MonitorCommand::CommandRegister),
            "stack" => Ok(MonitorCommand::Stack),
            "ram" => Ok(MonitorCommand::Ram),
            "pram" => Ok(MonitorCommand::Pram),
            "rom" => Ok(MonitorCommand::Rom),
            "off" => Ok(MonitorCommand::Detach),
            "q" => Ok(MonitorCommand::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// What the monitor asked for back, after applying a [`MonitorCommand`] to
/// a processor snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorReply {
    State(ProcessorState),
    Register(u8),
    ProgramCounter(u16),
    Accumulator(u8),
    Carry(bool),
    Pin10(bool),
    CommandRegister(u8),
    Stack([u16; 3]),
    Ram(Vec<u8>),
    Pram(Vec<u8>),
    Rom(Vec<u16>),
    BreakpointSet(u16),
    Detached,
    Quit,
}

/// Answers a single [`MonitorCommand`] against `processor`'s current state.
pub fn apply(processor: &Processor, command: &MonitorCommand) -> MonitorReply {
    match *command {
        MonitorCommand::Registers => MonitorReply::State(processor.state()),
        MonitorCommand::Register(n) => {
            MonitorReply::Register(processor.read_register(n).unwrap_or(0))
        }
        MonitorCommand::ProgramCounter => MonitorReply::ProgramCounter(processor.pc),
        MonitorCommand::Accumulator => MonitorReply::Accumulator(processor.acc),
        MonitorCommand::Carry => MonitorReply::Carry(processor.read_carry()),
        MonitorCommand::Pin10 => MonitorReply::Pin10(processor.pin10),
        MonitorCommand::CommandRegister => {
            MonitorReply::CommandRegister(processor.command_register)
        }
        MonitorCommand::Stack => MonitorReply::Stack(processor.stack),
        MonitorCommand::Ram => MonitorReply::Ram(processor.ram.to_vec()),
        MonitorCommand::Pram => MonitorReply::Pram(processor.ram.to_vec()),
        MonitorCommand::Rom => MonitorReply::Rom(processor.rom.to_vec()),
        MonitorCommand::SetBreakpoint(addr) => MonitorReply::BreakpointSet(addr),
        MonitorCommand::Detach => MonitorReply::Detached,
        MonitorCommand::Quit => MonitorReply::Quit,
    }
}

/// A minimal [`MonitorHook`] that halts execution at a fixed set of
/// breakpoint addresses; a caller-driven shell collaborator would compose
/// this with interactive stepping instead of halting outright.
#[derive(Debug, Clone, Default)]
pub struct BreakpointMonitor {
    pub breakpoints: Vec<u16>,
    pub halted_at: Option<u16>,
}

impl BreakpointMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_breakpoint(&mut self, address: u16) {
        if !self.breakpoints.contains(&address) {
            self.breakpoints.push(address);
        }
    }
}

impl MonitorHook for BreakpointMonitor {
    fn on_boundary(&mut self, processor: &Processor) -> MonitorDecision {
        if self.breakpoints.contains(&processor.pc) {
            self.halted_at = Some(processor.pc);
            MonitorDecision::Halt
        } else {
            MonitorDecision::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_register_and_breakpoint_commands() {
        assert_eq!(MonitorCommand::parse("reg7"), Ok(MonitorCommand::Register(7)));
        assert_eq!(
            MonitorCommand::parse("b 512"),
            Ok(MonitorCommand::SetBreakpoint(512))
        );
    }

    #[test]
    fn unknown_command_is_an_error_sentinel() {
        assert_eq!(
            MonitorCommand::parse("bogus"),
            Err(UnknownCommand("bogus".to_string()))
        );
    }

    #[test]
    fn breakpoint_monitor_halts_at_configured_address() {
        let mut monitor = BreakpointMonitor::new();
        monitor.add_breakpoint(10);
        let mut processor = Processor::new();
        processor.pc = 10;
        assert_eq!(monitor.on_boundary(&processor), MonitorDecision::Halt);
        processor.pc = 11;
        assert_eq!(monitor.on_boundary(&processor), MonitorDecision::Continue);
    }
}
