/// how deep subroutine calls may nest
pub const CHIP8_STACK_DEPTH: usize = 12;

/// the call stack overflowed or underflowed; the interpreter attaches the
/// faulting address when it turns this into an `ExecError`
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StackFault {
    Overflow,
    Underflow,
}

/// Bounded stack of return addresses. Entries live in a fixed array and
/// `depth` says how many are in use.
#[derive(Debug, Clone)]
pub struct CallStack {
    entries: [u16; CHIP8_STACK_DEPTH],
    depth: usize,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            entries: [0; CHIP8_STACK_DEPTH],
            depth: 0,
        }
    }

    /// push a return address; a full stack is left untouched
    pub fn push(&mut self, addr: u16) -> Result<(), StackFault> {
        if self.depth == CHIP8_STACK_DEPTH {
            return Err(StackFault::Overflow);
        }
        self.entries[self.depth] = addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, StackFault> {
        if self.depth == 0 {
            return Err(StackFault::Underflow);
        }
        self.depth -= 1;
        Ok(self.entries[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// return addresses in use, oldest first
    pub fn as_slice(&self) -> &[u16] {
        &self.entries[..self.depth]
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
