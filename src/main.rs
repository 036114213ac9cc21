use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use chip8vm::config::{DEFAULT_KEY_HOLD_TICKS, DEFAULT_STEPS_PER_TICK, DEFAULT_TICK_RATE_HZ};
use chip8vm::display::MonoTermDisplay;
use chip8vm::input::TermInput;
use chip8vm::instruction::disassemble;
use chip8vm::memory::CHIP8_PROGRAM_ADDR;
use chip8vm::{Chip8Interpreter, Config, Emulator, HostSettings, Outcome};

/// Run a CHIP-8 ROM in the terminal.
///
/// Keypad is 1234/QWER/ASDF/ZXCV; space pauses, escape quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// ROM image to load at 0x200
    rom: PathBuf,

    /// instructions executed per tick
    #[arg(short, long, default_value_t = DEFAULT_STEPS_PER_TICK)]
    steps_per_tick: u32,

    /// ticks per second; timers count down once per tick
    #[arg(short, long, default_value_t = DEFAULT_TICK_RATE_HZ)]
    tick_rate: f64,

    /// how many ticks a key press counts as held
    #[arg(long, default_value_t = DEFAULT_KEY_HOLD_TICKS)]
    key_hold_ticks: u32,

    /// stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// treat unknown opcodes as errors rather than skipping them
    #[arg(long)]
    strict: bool,

    /// seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// print a listing of the ROM and exit
    #[arg(short, long)]
    disassemble: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom).with_context(|| format!("reading {}", args.rom.display()))?;

    if args.disassemble {
        for line in disassemble(&rom, CHIP8_PROGRAM_ADDR) {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut interpreter = Chip8Interpreter::new(Config {
        strict: args.strict,
        seed: args.seed,
    });
    interpreter
        .load_program(&rom)
        .with_context(|| format!("loading {}", args.rom.display()))?;
    info!("loaded {} ({} bytes)", args.rom.display(), rom.len());

    let settings = HostSettings {
        tick_rate_hz: args.tick_rate,
        steps_per_tick: args.steps_per_tick,
        key_hold_ticks: args.key_hold_ticks,
        max_ticks: args.max_ticks,
    };

    // initialise
    let mut input = TermInput::new(settings.key_hold_ticks)?;
    let mut display = MonoTermDisplay::new()?;
    let outcome = {
        let mut emulator = Emulator::new(interpreter, &mut display, &mut input, settings);
        emulator.main_loop()?
    };
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }

    match outcome {
        Outcome::Faulted(e) => {
            error!("program faulted: {}", e);
            Err(e.into())
        }
        Outcome::Quit | Outcome::TickLimit => Ok(()),
    }
}
