use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

pub const CHIP8_KEY_COUNT: usize = 16;

/// The 16-key hex keypad. Written by the host, read by the key instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; CHIP8_KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// set a key up or down; anything outside 0x0-0xf is ignored
    pub fn set(&mut self, key: u8, down: bool) {
        match self.keys.get_mut(key as usize) {
            Some(k) => *k = down,
            None => warn!("ignoring state change for non-existent key {:#04x}", key),
        }
    }

    pub fn press(&mut self, key: u8) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: u8) {
        self.set(key, false);
    }

    pub fn release_all(&mut self) {
        self.keys = [false; CHIP8_KEY_COUNT];
    }

    pub fn is_down(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// lowest-numbered key currently held, if any
    pub fn first_down(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }
}

/// what the host can be told by whatever is reading the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(u8),
    KeyUp(u8),
    TogglePause,
    Quit,
}

/// reads keypresses
pub trait Input {
    /// everything that has happened since the last poll, oldest first
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error>;
}

/// map of keys on the left-hand side of a qwerty keyboard to the COSMAC
/// keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// Terminal keyboard input via crossterm. Terminals only report presses
/// (and auto-repeats), so a key is held down for `hold_ticks` polls after
/// its last press and then released.
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: [u32; CHIP8_KEY_COUNT],
    hold_ticks: u32,
}

impl TermInput {
    pub fn new(hold_ticks: u32) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; CHIP8_KEY_COUNT],
            hold_ticks,
        })
    }

    fn map_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<InputEvent> {
        match code {
            KeyCode::Esc => Some(InputEvent::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputEvent::Quit)
            }
            KeyCode::Char(' ') => Some(InputEvent::TogglePause),
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(&mapped_key) => {
                    self.held[mapped_key as usize] = self.hold_ticks;
                    Some(InputEvent::KeyDown(mapped_key))
                }
                None => {
                    warn!("can't map {:?} to a COSMAC key", key);
                    None
                }
            },
            _ => None,
        }
    }

    /// count down held keys, releasing any that have expired
    fn expire_held(&mut self, events: &mut Vec<InputEvent>) {
        for (key, ticks) in self.held.iter_mut().enumerate() {
            if *ticks > 0 {
                *ticks -= 1;
                if *ticks == 0 {
                    events.push(InputEvent::KeyUp(key as u8));
                }
            }
        }
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        let mut events = Vec::new();
        self.expire_held(&mut events);
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                if let Some(e) = self.map_key(evt.code, evt.modifiers) {
                    events.push(e);
                }
            }
        }
        Ok(events)
    }
}

/// scripted Input for testing; each poll hands out the next batch
pub struct DummyInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl DummyInput {
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        DummyInput {
            batches: batches.into(),
        }
    }
}

impl Input for DummyInput {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, io::Error> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_press_release() {
        let mut k = Keypad::new();
        assert_eq!(k.first_down(), None);
        k.press(0xa);
        k.press(0x3);
        assert!(k.is_down(0xa));
        assert_eq!(k.first_down(), Some(0x3));
        k.release(0x3);
        assert_eq!(k.first_down(), Some(0xa));
        k.release_all();
        assert!(!k.is_down(0xa));
    }

    #[test]
    fn test_keypad_ignores_out_of_range() {
        let mut k = Keypad::new();
        k.press(0x10);
        assert_eq!(k, Keypad::new());
        assert!(!k.is_down(0x10));
    }

    #[test]
    fn test_keymap_is_complete() {
        let map = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        let mut keys: Vec<u8> = map.values().copied().collect();
        keys.sort();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    // NB. built by hand so the tests don't need a tty in raw mode
    fn term_input(hold_ticks: u32) -> TermInput {
        TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; CHIP8_KEY_COUNT],
            hold_ticks,
        }
    }

    #[test]
    fn test_term_key_mapping() {
        let mut i = term_input(3);
        let none = KeyModifiers::NONE;
        assert_eq!(
            i.map_key(KeyCode::Char('x'), none),
            Some(InputEvent::KeyDown(0x0))
        );
        assert_eq!(
            i.map_key(KeyCode::Char('V'), KeyModifiers::SHIFT),
            Some(InputEvent::KeyDown(0xf))
        );
        assert_eq!(
            i.map_key(KeyCode::Char(' '), none),
            Some(InputEvent::TogglePause)
        );
        assert_eq!(i.map_key(KeyCode::Esc, none), Some(InputEvent::Quit));
        assert_eq!(
            i.map_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(InputEvent::Quit)
        );
        assert_eq!(i.map_key(KeyCode::Char('p'), none), None);
        assert_eq!(i.map_key(KeyCode::Enter, none), None);
    }

    #[test]
    fn test_term_held_keys_expire() {
        let mut i = term_input(2);
        i.map_key(KeyCode::Char('1'), KeyModifiers::NONE);
        let mut events = Vec::new();
        i.expire_held(&mut events);
        assert!(events.is_empty());
        i.expire_held(&mut events);
        assert_eq!(events, vec![InputEvent::KeyUp(0x1)]);
        events.clear();
        i.expire_held(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_dummy_input_batches() -> Result<(), io::Error> {
        let mut i = DummyInput::new(vec![
            vec![InputEvent::KeyDown(1), InputEvent::TogglePause],
            vec![InputEvent::Quit],
        ]);
        assert_eq!(
            i.poll_events()?,
            vec![InputEvent::KeyDown(1), InputEvent::TogglePause]
        );
        assert_eq!(i.poll_events()?, vec![InputEvent::Quit]);
        assert_eq!(i.poll_events()?, vec![]);
        Ok(())
    }
}
