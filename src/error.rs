use crate::machine::RunState;
use std::io;

/// things that can go wrong getting a program into memory
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("could not read ROM: {0}")]
    Io(#[from] io::Error),
}

/// things that can go wrong executing a single instruction
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("stack overflow: call at {pc:#06X} exceeds the maximum nesting depth")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("unsupported opcode {opcode:#06X} at {pc:#06X}")]
    UnsupportedOpcode { opcode: u16, pc: u16 },

    #[error("interpreter is {0:?}, not running")]
    NotRunning(RunState),
}

impl ExecError {
    /// fatal errors mean the emulated program can't carry on; the host
    /// should halt rather than step again
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExecError::StackOverflow { .. } | ExecError::StackUnderflow { .. }
        )
    }
}

/// errors surfaced by the host loop
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("host i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("tick rate must be a positive number of Hz, got {0}")]
    InvalidTickRate(f64),
}
