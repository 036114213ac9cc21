//! The host side of things: owns the clock and the peripherals, and drives
//! the interpreter.
//!
//! Each tick (60Hz by default):
//!
//!  * drain input events into the keypad and the run state
//!  * if running, step the interpreter `steps_per_tick` times
//!  * if still running, count the timers down by one
//!  * draw the frame
//!  * sleep until the next tick is due

use crate::config::HostSettings;
use crate::display::Display;
use crate::error::{ExecError, HostError};
use crate::input::{Input, InputEvent};
use crate::interpreter::Chip8Interpreter;
use crate::machine::RunState;
use log::{debug, error, warn};
use std::time::{Duration, Instant};

/// why the main loop gave up
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// asked to quit
    Quit,
    /// the program hit a fatal error and the machine was halted
    Faulted(ExecError),
    /// ran for `max_ticks`
    TickLimit,
}

pub struct Emulator<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    settings: HostSettings,
    ticks: u64,
}

impl<'a> Emulator<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        settings: HostSettings,
    ) -> Emulator<'a> {
        Emulator {
            interpreter,
            display,
            input,
            settings,
            ticks: 0,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn apply(&mut self, event: InputEvent) {
        let machine = self.interpreter.machine_mut();
        match event {
            InputEvent::KeyDown(key) => machine.keypad_mut().press(key),
            InputEvent::KeyUp(key) => machine.keypad_mut().release(key),
            InputEvent::TogglePause => machine.toggle_pause(),
            InputEvent::Quit => machine.halt(),
        }
    }

    /// Run one host tick. A fatal error halts the machine and is handed
    /// back; anything else that goes wrong in the program is logged.
    pub fn tick(&mut self) -> Result<Option<ExecError>, HostError> {
        for event in self.input.poll_events()? {
            self.apply(event);
        }

        let mut fault = None;
        if self.interpreter.machine().is_running() {
            for _ in 0..self.settings.steps_per_tick {
                match self.interpreter.step() {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => {
                        error!("{}; halting", e);
                        self.interpreter.machine_mut().halt();
                        fault = Some(e);
                        break;
                    }
                    Err(e @ ExecError::UnsupportedOpcode { .. }) => warn!("{}", e),
                    Err(ExecError::NotRunning(_)) => break,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let machine = self.interpreter.machine_mut();
        if machine.is_running() {
            machine.decrement_timers();
        }

        let machine = self.interpreter.machine();
        self.display.draw(machine.display(), machine.run_state())?;
        self.ticks += 1;
        Ok(fault)
    }

    /// tick at the configured rate until told to stop
    pub fn main_loop(&mut self) -> Result<Outcome, HostError> {
        let rate = self.settings.tick_rate_hz;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(HostError::InvalidTickRate(rate));
        }
        let period = Duration::try_from_secs_f64(1.0 / rate)
            .map_err(|_| HostError::InvalidTickRate(rate))?;
        let mut next = Instant::now();
        debug!(
            "main loop at {}Hz, {} steps per tick",
            self.settings.tick_rate_hz, self.settings.steps_per_tick
        );

        loop {
            next += period;

            if let Some(e) = self.tick()? {
                return Ok(Outcome::Faulted(e));
            }
            if self.interpreter.machine().run_state() == RunState::Halted {
                return Ok(Outcome::Quit);
            }
            if let Some(max) = self.settings.max_ticks {
                if self.ticks >= max {
                    return Ok(Outcome::TickLimit);
                }
            }

            let now = Instant::now();
            if next > now {
                spin_sleep::sleep(next - now);
            } else {
                // fell behind; don't try to catch up
                next = now;
            }
        }
    }
}
