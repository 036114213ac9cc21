use crate::error::LoadError;
use log::{debug, warn};
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the flat RAM of the machine
pub trait MemoryMap {
    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) {
        self.get_rw_slice(addr, data.len()).copy_from_slice(data);
    }

    /// get a single byte
    fn get_byte(&self, addr: u16) -> u8 {
        self.get_ro_slice(addr, 1)[0]
    }

    /// get a big-endian two-byte word (an opcode)
    fn get_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.get_byte(addr), self.get_byte(addr.wrapping_add(1))])
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// all addresses wrap at the top of RAM
pub const CHIP8_ADDR_MASK: u16 = 0x0fff;

/// where the program is loaded, and where execution begins
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// biggest ROM that fits between the program address and the top of RAM
pub const CHIP8_MAX_ROM_SIZE: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// font glyphs live at the very bottom of RAM, 5 bytes per hex digit
pub const CHIP8_FONT_ADDR: u16 = 0x0000;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;
pub const CHIP8_FONT_END: u16 = CHIP8_FONT_ADDR + CHIP8_FONT.len() as u16;

/// Defines the CHIP-8 memory map
///   0x0000-0x004f  font (read-only to programs)
///   0x0050-0x01ff  unused
///   0x0200-0x0fff  program
pub struct Chip8Memory {
    bytes: Box<[u8; CHIP8_RAM_SIZE_BYTES]>,
}

impl MemoryMap for Chip8Memory {
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = addr as usize;
        &self.bytes[a..(a + len)]
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = addr as usize;
        &mut self.bytes[a..(a + len)]
    }

    fn get_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize]
    }
}

impl Chip8Memory {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8Memory {
            bytes: Box::new([0u8; CHIP8_RAM_SIZE_BYTES]),
        };
        mm.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
        mm
    }

    /// copy a ROM image in at 0x200; the font is left alone
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > CHIP8_MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: rom.len(),
                max: CHIP8_MAX_ROM_SIZE,
            });
        }
        self.write(rom, CHIP8_PROGRAM_ADDR);
        debug!(
            "loaded {} byte program at {:#06x}",
            rom.len(),
            CHIP8_PROGRAM_ADDR
        );
        Ok(())
    }

    /// read an unknown amount of data and load it as a program
    pub fn load_from(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }

    /// store a byte on behalf of the running program. the font region is
    /// off-limits, so writes into it are dropped
    pub fn store(&mut self, addr: u16, value: u8) {
        let addr = addr & CHIP8_ADDR_MASK;
        if addr < CHIP8_FONT_END {
            warn!("dropped write of {:#04x} into font area at {:#06x}", value, addr);
            return;
        }
        self.bytes[addr as usize] = value;
    }

    /// address of the glyph for the low nibble of `digit`
    pub fn font_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + (digit & 0x0f) as u16 * CHIP8_FONT_GLYPH_BYTES
    }
}

impl Default for Chip8Memory {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8Memory::new();
        // NB. memory is zeroed from 0x50 because before that we bake in the font
        assert_eq!(m.bytes[0x50..], [0; 0xfb0]);
    }

    #[test]
    fn test_font_layout() {
        let m = Chip8Memory::new();
        assert_eq!(m.get_ro_slice(0, 5), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(Chip8Memory::font_addr(0xa), 50);
        assert_eq!(m.get_ro_slice(Chip8Memory::font_addr(0xf), 5), &CHIP8_FONT[75..]);
        assert_eq!(CHIP8_FONT_END, 0x50);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8Memory::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 0x308);
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8Memory::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200);
        assert_eq!(m.get_word(0x204), 0x0405);
    }

    #[test]
    fn test_read_word_wraps_at_top_of_ram() {
        let mut m = Chip8Memory::new();
        m.write(&[0xab], 0xfff);
        // second byte comes from 0x000, the top row of the '0' glyph
        assert_eq!(m.get_word(0xfff), 0xabf0);
    }

    #[test]
    #[should_panic]
    fn test_write_too_much_panic() {
        let mut dst = Chip8Memory::new();
        dst.write(&[0; 8], 4089);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut dst = Chip8Memory::new();
        dst.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2), &[0x00, 0xe0]);
        assert_eq!(dst.get_ro_slice(0, 80), &CHIP8_FONT);
        Ok(())
    }

    #[test]
    fn test_program_load_from_reader() -> Result<(), LoadError> {
        let mut dst = Chip8Memory::new();
        let mut prog: &[u8] = &[0x60, 0x0a];
        dst.load_from(&mut prog)?;
        assert_eq!(dst.get_word(0x200), 0x600a);
        Ok(())
    }

    #[test]
    fn test_program_load_largest_fits() -> Result<(), LoadError> {
        let mut dst = Chip8Memory::new();
        dst.load_program(&[0xff; CHIP8_MAX_ROM_SIZE])?;
        assert_eq!(dst.get_byte(0xfff), 0xff);
        Ok(())
    }

    #[test]
    fn test_program_load_too_large() {
        let mut dst = Chip8Memory::new();
        let rom = vec![0x12; CHIP8_MAX_ROM_SIZE + 1];
        match dst.load_program(&rom) {
            Err(LoadError::RomTooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
        // nothing was written
        assert_eq!(dst.get_byte(0x200), 0);
    }

    #[test]
    fn test_store_protects_font() {
        let mut m = Chip8Memory::new();
        m.store(0x0004, 0x00);
        assert_eq!(m.get_byte(0x0004), 0xF0);
        m.store(0x0050, 0x42);
        assert_eq!(m.get_byte(0x0050), 0x42);
        // wraps round to 0x0001, which is font
        m.store(0x1001, 0x00);
        assert_eq!(m.get_byte(0x0001), 0x90);
    }
}
