//! An emulator and assembler toolchain for the Intel 4004 4-bit
//! microprocessor: processor state and instruction semantics, a two-pass
//! assembler, a fetch-decode-dispatch execution engine, a disassembler,
//! and the read-only introspection surface a monitor collaborator sits on.
//!
//! File I/O, binary/object-format writers, listing pretty-printers, and the
//! interactive command shell itself are external collaborators' concerns;
//! this crate exposes the data shapes and hooks they consume.

pub mod assembler;
pub mod bits;
pub mod disassembler;
pub mod engine;
pub mod error;
pub mod instruction;
pub mod monitor;
pub mod opcode;
pub mod processor;

pub use assembler::{assemble, LabelEntry, Location, ObjectModule};
pub use disassembler::{disassemble, DisassembledLine};
pub use engine::{run, step, MonitorDecision, MonitorHook, StepOutcome, TraceHook};
pub use error::{AssemblyError, AssemblyErrorKind, ProcessorError};
pub use processor::{Processor, ProcessorState};
