//! Typed error taxonomy for the processor core and the assembler.
//!
//! Suboperations fail fast with a [`ProcessorError`] variant; the assembler
//! wraps source-line context around failures in an [`AssemblyError`].

use thiserror::Error;

/// Errors raised by the processor state model and its suboperations (C3/C4/C5).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    #[error("register index {0} is out of range 0..=15")]
    InvalidRegister(u8),

    #[error("register pair index {0} is out of range 0..=7")]
    InvalidRegisterPair(u8),

    #[error("value {value} does not fit in a 4-bit register")]
    ValueTooLargeForRegister { value: u16 },

    #[error("value {value} does not fit in an 8-bit register pair")]
    ValueTooLargeForRegisterPair { value: u16 },

    #[error("value {value} does not fit in the 4-bit accumulator")]
    ValueTooLargeForAccumulator { value: u16 },

    #[error("{bits}-bit helper called with unsupported bit width")]
    InvalidBitValue { bits: u8 },

    #[error("{chunk}-bit chunk size is unsupported")]
    InvalidChunkValue { chunk: u8 },

    #[error("{bits} bits is not evenly divisible by {chunk}-bit chunks")]
    IncompatibleChunkBit { bits: u8, chunk: u8 },

    #[error("value {value} does not fit in {bits} bits")]
    ValueOutOfRangeForBits { value: u32, bits: u8 },

    #[error("{0:?} is not a binary digit string")]
    NotABinaryNumber(String),

    #[error("address {0} is outside the 8-bit range 0..=255")]
    AddressOutOf8BitRange(i32),

    #[error("program counter {pc} + {words} word(s) exceeds memory size {size}")]
    ProgramCounterOutOfBounds { pc: u16, words: u16, size: u16 },

    #[error("pin 10 value {0} is not 0 or 1")]
    InvalidPin10Value(u8),

    #[error("RAM bank {0} is out of range 0..=7")]
    InvalidRamBank(u8),

    #[error("command register is zero but a non-zero address was required")]
    InvalidCommandRegisterContent,

    #[error("command register decode shape {0:?} is unknown")]
    InvalidCommandRegisterFormat(CommandRegisterShapeTag),

    #[error("value {0} does not fit in the 12-bit address stack")]
    ValueOutOfRangeForStack(u32),

    #[error("opcode byte {0:#04x} does not encode a 4004 instruction")]
    InvalidOpcode(u8),
}

/// Stand-in for an unrecognized decode shape tag, kept separate from
/// [`crate::processor::CommandRegisterShape`] so an out-of-range tag value
/// (e.g. read from serialized state or a monitor command) can still be
/// reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRegisterShapeTag(pub String);

/// Errors raised while assembling source text (C6). Carries the 1-based
/// source line number so a caller can format a `file:line: message`
/// diagnostic the way a compiler front-end would.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct AssemblyError {
    pub line: usize,
    pub kind: AssemblyErrorKind,
}

impl AssemblyError {
    pub fn new(line: usize, kind: AssemblyErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyErrorKind {
    #[error("label {0:?} is already defined")]
    DuplicateLabel(String),

    #[error("label {0:?} is not defined")]
    UndefinedLabel(String),

    #[error("unknown mnemonic {0:?}")]
    UnknownMnemonic(String),

    #[error("instruction encountered before an `org` directive")]
    MissingOrg,

    #[error("`org` requires an argument of `rom`, `ram`, or an address")]
    InvalidOrgArgument(String),

    #[error("`pin` requires an argument of 0 or 1, got {0:?}")]
    InvalidPinArgument(String),

    #[error("mnemonic {mnemonic:?} expects {expected} operand(s), got {got}")]
    WrongOperandCount {
        mnemonic: String,
        expected: u8,
        got: u8,
    },

    #[error("operand {0:?} is not a valid register, pair, data value, or label")]
    InvalidOperand(String),

    #[error("condition operand {0:?} uses letters other than I, A, C, T")]
    InvalidConditionLetters(String),

    #[error("value {value} does not fit in the field required by {mnemonic:?}")]
    OperandOutOfRange { mnemonic: String, value: i64 },

    #[error("program exceeds the 4096-word address space at address {0}")]
    AddressSpaceExhausted(u16),

    #[error(transparent)]
    Processor(#[from] ProcessorError),
}
