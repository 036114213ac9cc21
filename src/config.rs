/// How the interpreter treats the murkier corners of the instruction set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// report unknown opcodes as errors instead of skipping them
    pub strict: bool,
    /// fixed seed for CXNN, so runs can be replayed
    pub seed: Option<u64>,
}

/// the display refresh and timer rate
pub const DEFAULT_TICK_RATE_HZ: f64 = 60.0;
/// instructions executed per tick
pub const DEFAULT_STEPS_PER_TICK: u32 = 1;
/// how long a terminal key press counts as held
pub const DEFAULT_KEY_HOLD_TICKS: u32 = 6;

/// Settings for the host loop that drives the interpreter
#[derive(Debug, Clone, PartialEq)]
pub struct HostSettings {
    pub tick_rate_hz: f64,
    pub steps_per_tick: u32,
    pub key_hold_ticks: u32,
    /// stop after this many ticks; run until quit if None
    pub max_ticks: Option<u64>,
}

impl Default for HostSettings {
    fn default() -> Self {
        HostSettings {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            steps_per_tick: DEFAULT_STEPS_PER_TICK,
            key_hold_ticks: DEFAULT_KEY_HOLD_TICKS,
            max_ticks: None,
        }
    }
}
