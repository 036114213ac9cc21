//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter executes exactly one instruction per `step()`, and
//!   never touches the wall clock, the terminal or the keyboard
//! * the host owns time: it decides when to step, and counts the timers
//!   down once per 60Hz tick
//! * display and input are behind traits, so the host loop can be driven
//!   by a terminal or by tests
//! * no sound; the sound timer is tracked but nothing beeps
//!
//! Model
//!
//! Emulator (host)
//!  |-- display, input, settings
//!  |-- interpreter(config)
//!  |    |-- machine
//!  |    |    |-- memory (font at 0x000, program at 0x200)
//!  |    |    |-- V0..VF, I, program counter, call stack
//!  |    |    |-- delay/sound timers, keypad, frame buffer
//!  |    |    `-- run state: Running <-> Paused, anything -> Halted
//!  |    `-- instruction decode
//!  `-- main loop
//!       |-- poll input; update keypad and run state
//!       |-- while running: step() x steps_per_tick; halt on fatal errors
//!       |-- decrement timers
//!       |-- draw
//!       `-- sleep until the next tick
pub mod config;
pub mod display;
pub mod emulator;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod stack;

pub use config::{Config, HostSettings};
pub use emulator::{Emulator, Outcome};
pub use error::{ExecError, HostError, LoadError};
pub use instruction::{Instruction, Opcode};
pub use interpreter::Chip8Interpreter;
pub use machine::{Machine, RunState};
