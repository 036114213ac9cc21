//! # interpreter
//!
//! Executes one CHIP-8 instruction per `step()`:
//!
//!  1. fetch the big-endian word at the program counter
//!  2. move the program counter on by 2, *before* executing, so jumps,
//!     calls and skips work relative to the next instruction
//!  3. decode into an `Instruction`
//!  4. execute it against the machine state
//!
//! VF is an ordinary register that some instructions also use as a flag.
//! Whenever an instruction uses it as a flag it is overwritten, never
//! accumulated.
//!
//! A stack overflow or underflow puts the program counter back on the
//! faulting instruction and leaves everything else alone, so the host can
//! show exactly where things went wrong. The interpreter never halts
//! itself; that's up to the host.

use crate::config::Config;
use crate::error::{ExecError, LoadError};
use crate::instruction::{Instruction, Opcode};
use crate::machine::Machine;
use crate::memory::{Chip8Memory, MemoryMap, CHIP8_ADDR_MASK};
use crate::stack::StackFault;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// the flag register
const VF: usize = 0xf;

/// tallest sprite DXYN can draw
const MAX_SPRITE_ROWS: usize = 15;

pub struct Chip8Interpreter {
    machine: Machine,
    config: Config,
    rng: StdRng,
}

impl Chip8Interpreter {
    pub fn new(config: Config) -> Chip8Interpreter {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            machine: Machine::new(),
            config,
            rng,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.machine.load(rom)
    }

    /// load a chip8 program from a file or whatever
    pub fn load_from(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        self.machine.load_from(reader)
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// for the host: keypad, timers and run state
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// fetch, decode and execute exactly one instruction, returning what
    /// was executed
    pub fn step(&mut self) -> Result<Instruction, ExecError> {
        if !self.machine.is_running() {
            return Err(ExecError::NotRunning(self.machine.run_state()));
        }

        let pc = self.machine.program_counter;
        let opcode = self.machine.memory.get_word(pc);
        self.machine.program_counter = advance(pc);

        let instruction = Instruction::decode(Opcode(opcode));
        trace!("{:04X}  {:04X}  {}", pc, opcode, instruction);

        match self.execute(instruction, pc) {
            Ok(()) => Ok(instruction),
            Err(e) => {
                if e.is_fatal() {
                    self.machine.program_counter = pc;
                }
                Err(e)
            }
        }
    }

    /// `pc` is the address `instruction` was fetched from
    fn execute(&mut self, instruction: Instruction, pc: u16) -> Result<(), ExecError> {
        use Instruction::*;

        let m = &mut self.machine;
        match instruction {
            ClearScreen => m.display.clear(),
            Return => {
                m.program_counter = m.stack.pop().map_err(|f| stack_error(f, pc))?;
            }
            Jump(addr) => m.program_counter = addr,
            Call(addr) => {
                m.stack
                    .push(m.program_counter)
                    .map_err(|f| stack_error(f, pc))?;
                m.program_counter = addr;
            }
            SkipEqByte(x, nn) => skip_next_if(m.v[x] == nn, m),
            SkipNeByte(x, nn) => skip_next_if(m.v[x] != nn, m),
            SkipEqReg(x, y) => skip_next_if(m.v[x] == m.v[y], m),
            LoadByte(x, nn) => m.v[x] = nn,
            AddByte(x, nn) => m.v[x] = m.v[x].wrapping_add(nn),
            LoadReg(x, y) => m.v[x] = m.v[y],
            Or(x, y) => m.v[x] |= m.v[y],
            And(x, y) => m.v[x] &= m.v[y],
            Xor(x, y) => m.v[x] ^= m.v[y],
            AddReg(x, y) => {
                let (sum, carry) = m.v[x].overflowing_add(m.v[y]);
                m.v[VF] = carry as u8;
                m.v[x] = sum;
            }
            Sub(x, y) => {
                let (vx, vy) = (m.v[x], m.v[y]);
                m.v[VF] = (vy > vx) as u8;
                m.v[x] = vx.wrapping_sub(vy);
            }
            ShiftRight(x) => {
                let vx = m.v[x];
                m.v[VF] = vx & 1;
                m.v[x] = vx >> 1;
            }
            SubN(x, y) => {
                let (vx, vy) = (m.v[x], m.v[y]);
                m.v[VF] = (vy < vx) as u8;
                m.v[x] = vy.wrapping_sub(vx);
            }
            ShiftLeft(x) => {
                let vx = m.v[x];
                m.v[VF] = (vx >> 7) & 1;
                m.v[x] = vx << 1;
            }
            SkipNeReg(x, y) => skip_next_if(m.v[x] != m.v[y], m),
            LoadIndex(addr) => m.i = addr,
            JumpV0(addr) => m.program_counter = (m.v[0] as u16 + addr) & CHIP8_ADDR_MASK,
            Random(x, nn) => m.v[x] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                let n = n as usize;
                let mut rows = [0u8; MAX_SPRITE_ROWS];
                for (r, row) in rows.iter_mut().take(n).enumerate() {
                    *row = m.memory.get_byte(m.i.wrapping_add(r as u16));
                }
                let (vx, vy) = (m.v[x], m.v[y]);
                m.v[VF] = 0;
                if m.display.draw_sprite(vx, vy, &rows[..n]) {
                    m.v[VF] = 1;
                }
            }
            SkipKeyDown(x) => skip_next_if(m.keypad.is_down(m.v[x] & 0x0f), m),
            SkipKeyUp(x) => skip_next_if(!m.keypad.is_down(m.v[x] & 0x0f), m),
            LoadFromDelay(x) => m.v[x] = m.delay_timer,
            WaitKey(x) => match m.keypad.first_down() {
                Some(key) => m.v[x] = key,
                // go round again until something is pressed
                None => m.program_counter = pc,
            },
            LoadDelay(x) => m.delay_timer = m.v[x],
            LoadSound(x) => m.sound_timer = m.v[x],
            AddIndex(x) => m.i = m.i.wrapping_add(m.v[x] as u16),
            LoadFont(x) => m.i = Chip8Memory::font_addr(m.v[x]),
            StoreBcd(x) => {
                let vx = m.v[x];
                m.memory.store(m.i, vx / 100);
                m.memory.store(m.i.wrapping_add(1), (vx / 10) % 10);
                m.memory.store(m.i.wrapping_add(2), vx % 10);
            }
            StoreRegs(x) => {
                for r in 0..=x {
                    m.memory.store(m.i.wrapping_add(r as u16), m.v[r]);
                }
            }
            LoadRegs(x) => {
                for r in 0..=x {
                    m.v[r] = m.memory.get_byte(m.i.wrapping_add(r as u16));
                }
            }
            Unknown(op) => {
                if self.config.strict {
                    return Err(ExecError::UnsupportedOpcode { opcode: op.0, pc });
                }
                debug!("skipping unknown opcode {:#06x} at {:#06x}", op.0, pc);
            }
        }
        Ok(())
    }
}

/// next instruction address, wrapping at the top of RAM
fn advance(pc: u16) -> u16 {
    pc.wrapping_add(2) & CHIP8_ADDR_MASK
}

fn skip_next_if(condition: bool, m: &mut Machine) {
    if condition {
        m.program_counter = advance(m.program_counter);
    }
}

fn stack_error(fault: StackFault, pc: u16) -> ExecError {
    match fault {
        StackFault::Overflow => ExecError::StackOverflow { pc },
        StackFault::Underflow => ExecError::StackUnderflow { pc },
    }
}
