use std::fmt;

/// A raw 16-bit opcode, with accessors for the fixed fields every
/// instruction is carved out of:
///
/// ```text
///   F X Y N
///   | |___NN
///   |_____NNN
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// top nibble, which picks the instruction family
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0fff
    }

    pub fn nn(self) -> u8 {
        (self.0 & 0x00ff) as u8
    }

    pub fn n(self) -> u8 {
        (self.0 & 0x000f) as u8
    }

    pub fn x(self) -> usize {
        ((self.0 >> 8) & 0x0f) as usize
    }

    pub fn y(self) -> usize {
        ((self.0 >> 4) & 0x0f) as usize
    }
}

/// Every instruction the interpreter knows, with its operands already
/// pulled out. Registers are indices into V0..VF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0; the X nibble is ignored
    ClearScreen,
    /// 00EE; the X nibble is ignored
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqByte(usize, u8),
    /// 4XNN
    SkipNeByte(usize, u8),
    /// 5XY0
    SkipEqReg(usize, usize),
    /// 6XNN
    LoadByte(usize, u8),
    /// 7XNN
    AddByte(usize, u8),
    /// 8XY0
    LoadReg(usize, usize),
    /// 8XY1
    Or(usize, usize),
    /// 8XY2
    And(usize, usize),
    /// 8XY3
    Xor(usize, usize),
    /// 8XY4
    AddReg(usize, usize),
    /// 8XY5
    Sub(usize, usize),
    /// 8XY6
    ShiftRight(usize),
    /// 8XY7
    SubN(usize, usize),
    /// 8XY8, and 8XYE on most other interpreters
    ShiftLeft(usize),
    /// 9XY0
    SkipNeReg(usize, usize),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpV0(u16),
    /// CXNN
    Random(usize, u8),
    /// DXYN
    Draw(usize, usize, u8),
    /// EX9E
    SkipKeyDown(usize),
    /// EXA1
    SkipKeyUp(usize),
    /// FX07
    LoadFromDelay(usize),
    /// FX0A
    WaitKey(usize),
    /// FX15
    LoadDelay(usize),
    /// FX18
    LoadSound(usize),
    /// FX1E
    AddIndex(usize),
    /// FX29
    LoadFont(usize),
    /// FX33
    StoreBcd(usize),
    /// FX55
    StoreRegs(usize),
    /// FX65
    LoadRegs(usize),
    /// anything else, including the other 0NNN machine-code calls
    Unknown(Opcode),
}

impl Instruction {
    pub fn decode(op: Opcode) -> Instruction {
        use Instruction::*;

        let (x, y, n, nn, nnn) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        match op.family() {
            0x0 => match nn {
                0xe0 => ClearScreen,
                0xee => Return,
                _ => Unknown(op),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipEqByte(x, nn),
            0x4 => SkipNeByte(x, nn),
            0x5 => SkipEqReg(x, y),
            0x6 => LoadByte(x, nn),
            0x7 => AddByte(x, nn),
            0x8 => match n {
                0x0 => LoadReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x),
                0x7 => SubN(x, y),
                0x8 | 0xe => ShiftLeft(x),
                _ => Unknown(op),
            },
            0x9 => SkipNeReg(x, y),
            0xa => LoadIndex(nnn),
            0xb => JumpV0(nnn),
            0xc => Random(x, nn),
            0xd => Draw(x, y, n),
            0xe => match nn {
                0x9e => SkipKeyDown(x),
                0xa1 => SkipKeyUp(x),
                _ => Unknown(op),
            },
            0xf => match nn {
                0x07 => LoadFromDelay(x),
                0x0a => WaitKey(x),
                0x15 => LoadDelay(x),
                0x18 => LoadSound(x),
                0x1e => AddIndex(x),
                0x29 => LoadFont(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => Unknown(op),
            },
            _ => unreachable!("opcode family is a nibble"),
        }
    }
}

impl From<u16> for Instruction {
    fn from(opcode: u16) -> Self {
        Instruction::decode(Opcode(opcode))
    }
}

/// disassembly, in the usual Cowgod-ish mnemonics
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP {:#05X}", a),
            Call(a) => write!(f, "CALL {:#05X}", a),
            SkipEqByte(x, b) => write!(f, "SE V{:X}, {:#04X}", x, b),
            SkipNeByte(x, b) => write!(f, "SNE V{:X}, {:#04X}", x, b),
            SkipEqReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadByte(x, b) => write!(f, "LD V{:X}, {:#04X}", x, b),
            AddByte(x, b) => write!(f, "ADD V{:X}, {:#04X}", x, b),
            LoadReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x) => write!(f, "SHR V{:X}", x),
            SubN(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x) => write!(f, "SHL V{:X}", x),
            SkipNeReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(a) => write!(f, "LD I, {:#05X}", a),
            JumpV0(a) => write!(f, "JP V0, {:#05X}", a),
            Random(x, b) => write!(f, "RND V{:X}, {:#04X}", x, b),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyDown(x) => write!(f, "SKP V{:X}", x),
            SkipKeyUp(x) => write!(f, "SKNP V{:X}", x),
            LoadFromDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD V{:X}, K", x),
            LoadDelay(x) => write!(f, "LD DT, V{:X}", x),
            LoadSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            LoadFont(x) => write!(f, "LD F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
            Unknown(op) => write!(f, "DW {:#06X}", op.0),
        }
    }
}

/// disassemble a ROM image, one line per word, as `address  opcode  mnemonic`
pub fn disassemble(rom: &[u8], origin: u16) -> Vec<String> {
    rom.chunks(2)
        .enumerate()
        .map(|(i, word)| {
            let addr = origin.wrapping_add(2 * i as u16);
            let opcode = match *word {
                [hi, lo] => u16::from_be_bytes([hi, lo]),
                // odd trailing byte
                [hi] => u16::from_be_bytes([hi, 0]),
                _ => unreachable!("chunks(2) yields one or two bytes"),
            };
            format!(
                "{:04X}  {:04X}  {}",
                addr,
                opcode,
                Instruction::from(opcode)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    #[test]
    fn test_fields() {
        let op = Opcode(0xd7b3);
        assert_eq!(op.family(), 0xd);
        assert_eq!(op.x(), 0x7);
        assert_eq!(op.y(), 0xb);
        assert_eq!(op.n(), 0x3);
        assert_eq!(op.nn(), 0xb3);
        assert_eq!(op.nnn(), 0x7b3);
    }

    #[test]
    fn test_decode_table() {
        let cases = [
            (0x00e0u16, ClearScreen),
            (0x00ee, Return),
            (0x1234, Jump(0x234)),
            (0x2456, Call(0x456)),
            (0x342a, SkipEqByte(4, 0x2a)),
            (0x4a75, SkipNeByte(0xa, 0x75)),
            (0x5ae0, SkipEqReg(0xa, 0xe)),
            (0x63f5, LoadByte(3, 0xf5)),
            (0x7b12, AddByte(0xb, 0x12)),
            (0x8590, LoadReg(5, 9)),
            (0x8101, Or(1, 0)),
            (0x8642, And(6, 4)),
            (0x87f3, Xor(7, 0xf)),
            (0x8264, AddReg(2, 6)),
            (0x8c45, Sub(0xc, 4)),
            (0x8106, ShiftRight(1)),
            (0x86d7, SubN(6, 0xd)),
            (0x8e08, ShiftLeft(0xe)),
            (0x8e0e, ShiftLeft(0xe)),
            (0x9990, SkipNeReg(9, 9)),
            (0xa568, LoadIndex(0x568)),
            (0xbabc, JumpV0(0xabc)),
            (0xc5af, Random(5, 0xaf)),
            (0xd7b0, Draw(7, 0xb, 0)),
            (0xe49e, SkipKeyDown(4)),
            (0xeca1, SkipKeyUp(0xc)),
            (0xf907, LoadFromDelay(9)),
            (0xfd0a, WaitKey(0xd)),
            (0xf315, LoadDelay(3)),
            (0xf718, LoadSound(7)),
            (0xf91e, AddIndex(9)),
            (0xff29, LoadFont(0xf)),
            (0xf533, StoreBcd(5)),
            (0xf655, StoreRegs(6)),
            (0xf865, LoadRegs(8)),
        ];
        for (opcode, instr) in cases {
            assert_eq!(Instruction::from(opcode), instr, "{:#06x}", opcode);
        }
    }

    #[test]
    fn test_decode_system_family_by_low_byte() {
        assert_eq!(Instruction::from(0x0ae0u16), ClearScreen);
        assert_eq!(Instruction::from(0x01e0u16), ClearScreen);
        assert_eq!(Instruction::from(0x03eeu16), Return);
        assert_eq!(Instruction::from(0x0fe1u16), Unknown(Opcode(0x0fe1)));
    }

    #[test]
    fn test_decode_unknown() {
        for opcode in [0x0000u16, 0x0123, 0x00ef, 0x8009, 0x800f, 0xe000, 0xf0ff, 0xf075] {
            assert_eq!(Instruction::from(opcode), Unknown(Opcode(opcode)));
        }
    }

    fn asm(opcode: u16) -> String {
        Instruction::from(opcode).to_string()
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(asm(0x00e0), "CLS");
        assert_eq!(asm(0x1228), "JP 0x228");
        assert_eq!(asm(0x6a02), "LD VA, 0x02");
        assert_eq!(asm(0x8014), "ADD V0, V1");
        assert_eq!(asm(0xd01f), "DRW V0, V1, 15");
        assert_eq!(asm(0xf065), "LD V0, [I]");
        assert_eq!(asm(0x0123), "DW 0x0123");
    }

    #[test]
    fn test_disassemble() {
        let listing = disassemble(&[0x60, 0x0a, 0x61, 0x05, 0x80, 0x14, 0x12], 0x200);
        assert_eq!(
            listing,
            vec![
                "0200  600A  LD V0, 0x0A",
                "0202  6105  LD V1, 0x05",
                "0204  8014  ADD V0, V1",
                "0206  1200  JP 0x200",
            ]
        );
    }
}
