use thiserror::Error;

use crate::opcode::{Address, Opcode};

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("Address {address:#06X} is out of bounds, the memory is {len} bytes long.")]
    OutOfBounds { address: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

/// Raised before execution when an image does not fit its memory region.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ImageError {
    #[error("The program is {len} bytes long, but at most {max} bytes fit into memory.")]
    ProgramTooLarge { len: usize, max: usize },
    #[error("A font has to be exactly {expected} bytes long, got {len}.")]
    InvalidFontSize { len: usize, expected: usize },
}

#[derive(Error, Debug, PartialEq, Clone)]
#[error("Unknown compatibility level '{0}'.")]
pub struct ParseCompatLevelError(pub String);

/// A fault raised by a single machine step.
///
/// The machine is left exactly as it was before the faulting instruction,
/// the program counter still points at it.
#[derive(Error, Debug, PartialEq, Clone)]
#[error("Fault at {pc:#06X}: {source}")]
pub struct Fault {
    /// Address of the faulting instruction
    pub pc: Address,
    /// The opcode, if it could be fetched at all
    pub opcode: Option<Opcode>,
    #[source]
    pub source: ProcessError,
}

impl Fault {
    pub(crate) fn new<E>(pc: Address, opcode: Option<Opcode>, source: E) -> Self
    where
        E: Into<ProcessError>,
    {
        Self {
            pc,
            opcode,
            source: source.into(),
        }
    }
}
