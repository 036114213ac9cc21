use crate::display::FrameBuffer;
use crate::error::LoadError;
use crate::input::Keypad;
use crate::memory::{Chip8Memory, CHIP8_PROGRAM_ADDR};
use crate::stack::CallStack;
use log::debug;
use std::io;

/// Whether the host should be stepping the interpreter. Only the host
/// moves between these; the interpreter never changes its own run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    /// terminal; nothing gets you out of here
    Halted,
}

/// All of the machine's state. Registers, memory and the display only
/// change by executing instructions; the host gets read access to those
/// plus the keypad, timers and run state to drive.
pub struct Machine {
    pub(crate) memory: Chip8Memory,
    /// V0..VF; VF doubles as the carry/borrow/collision flag
    pub(crate) v: [u8; 16],
    pub(crate) i: u16,
    pub(crate) program_counter: u16,
    pub(crate) stack: CallStack,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) keypad: Keypad,
    pub(crate) display: FrameBuffer,
    pub(crate) state: RunState,
}

impl Machine {
    /// font loaded, everything else zeroed, ready to run from 0x200
    pub fn new() -> Self {
        Machine {
            memory: Chip8Memory::new(),
            v: [0; 16],
            i: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            stack: CallStack::new(),
            delay_timer: 0,
            sound_timer: 0,
            keypad: Keypad::new(),
            display: FrameBuffer::new(),
            state: RunState::Running,
        }
    }

    /// copy a ROM image in at 0x200
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.memory.load_program(rom)
    }

    /// load a ROM image from a file or whatever
    pub fn load_from(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        self.memory.load_from(reader)
    }

    pub fn memory(&self) -> &Chip8Memory {
        &self.memory
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn display(&self) -> &FrameBuffer {
        &self.display
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    /// one 60Hz tick's worth of countdown; both timers stop at zero
    pub fn decrement_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn pause(&mut self) {
        self.transition(RunState::Paused);
    }

    pub fn resume(&mut self) {
        self.transition(RunState::Running);
    }

    /// Running <-> Paused
    pub fn toggle_pause(&mut self) {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Halted => {}
        }
    }

    pub fn halt(&mut self) {
        self.transition(RunState::Halted);
    }

    fn transition(&mut self, to: RunState) {
        if self.state == RunState::Halted || self.state == to {
            return;
        }
        debug!("run state {:?} -> {:?}", self.state, to);
        self.state = to;
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
