use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
    #[error("Execution was interrupted while waiting for a key.")]
    Interrupted,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("Address {address:#06X} is out of bounds for a memory of {len} bytes")]
    OutOfBounds { address: usize, len: usize },
    #[error("Rom of {size} bytes does not fit into the {available} bytes of program memory")]
    RomTooLarge { size: usize, available: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum KeyError {
    #[error("The key wait was cancelled.")]
    Cancelled,
}

impl From<KeyError> for ProcessError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::Cancelled => ProcessError::Interrupted,
        }
    }
}
