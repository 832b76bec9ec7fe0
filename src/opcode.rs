use std::fmt;

use crate::u4;

/// A decoded CHIP-8 instruction.
///
/// The fields (x, y, n, nn, nnn) are the operands encoded in the instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 00E0 - Clear the display.
    ClearDisplay,
    /// 00EE - Return from a subroutine.
    Return,

    /// 1nnn - Jump to location nnn.
    Jump { nnn: u16 },
    /// Bnnn - Jump to location nnn + V0.
    JumpWithOffset { nnn: u16 },
    /// 2nnn - Call subroutine at nnn.
    Call { nnn: u16 },

    /// 3xnn - Skip next instruction if Vx == nn.
    SkipEqImm { x: u4, nn: u8 },
    /// 4xnn - Skip next instruction if Vx != nn.
    SkipNeImm { x: u4, nn: u8 },
    /// 5xy0 - Skip next instruction if Vx == Vy.
    SkipEqReg { x: u4, y: u4 },
    /// 9xy0 - Skip next instruction if Vx != Vy.
    SkipNeReg { x: u4, y: u4 },

    /// 6xnn - Set Vx = nn.
    LoadImm { x: u4, nn: u8 },
    /// 7xnn - Set Vx = Vx + nn, no carry.
    AddImm { x: u4, nn: u8 },
    /// 8xyN - Register to register arithmetic and logic.
    Alu { x: u4, y: u4, op: AluOp },

    /// Annn - Set I = nnn.
    LoadIndex { nnn: u16 },
    /// Fx1E - Set I = I + Vx.
    AddIndex { x: u4 },

    /// Cxnn - Set Vx = random byte AND nn.
    Random { x: u4, nn: u8 },
    /// Dxyn - Draw an n-row sprite from memory at I to (Vx, Vy).
    Draw { x: u4, y: u4, n: u4 },

    /// Ex9E - Skip next instruction if key Vx is pressed.
    SkipKeyPressed { x: u4 },
    /// ExA1 - Skip next instruction if key Vx is not pressed.
    SkipKeyNotPressed { x: u4 },
    /// Fx0A - Wait for a key press, store the key in Vx.
    WaitKey { x: u4 },

    /// Fx07 - Set Vx = delay timer.
    ReadDelay { x: u4 },
    /// Fx15 - Set delay timer = Vx.
    SetDelay { x: u4 },
    /// Fx18 - Set sound timer = Vx.
    SetSound { x: u4 },

    /// Fx29 - Set I = address of the font glyph for digit Vx.
    FontGlyph { x: u4 },
    /// Fx33 - Store the BCD digits of Vx at I, I+1, I+2.
    Bcd { x: u4 },
    /// Fx55 - Store V0..=Vx at I.
    StoreRegs { x: u4 },
    /// Fx65 - Load V0..=Vx from I.
    LoadRegs { x: u4 },

    /// Any word that none of the above match.
    Unknown(u16),
}

/// The 8xyN operations, selected by the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Set,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

/// Operand fields of an instruction word.
struct Fields {
    x: u4,
    y: u4,
    n: u4,
    nn: u8,
    nnn: u16,
}

impl Fields {
    fn of(word: u16) -> Self {
        Self {
            x: u4::from_low_bits((word >> 8) as u8),
            y: u4::from_low_bits((word >> 4) as u8),
            n: u4::from_low_bits(word as u8),
            nn: (word & 0x00FF) as u8,
            nnn: word & 0x0FFF,
        }
    }
}

impl Opcode {
    /// Decode a 16-bit instruction word.
    ///
    /// The top nibble picks the group; groups 0, 8, E and F are shared by several
    /// instructions and are resolved by a second lookup on the low nibble (or the
    /// low byte for group F).
    pub fn decode(word: u16) -> Self {
        let f = Fields::of(word);

        match word >> 12 {
            0x0 => Self::decode_system(word),
            0x1 => Opcode::Jump { nnn: f.nnn },
            0x2 => Opcode::Call { nnn: f.nnn },
            0x3 => Opcode::SkipEqImm { x: f.x, nn: f.nn },
            0x4 => Opcode::SkipNeImm { x: f.x, nn: f.nn },
            0x5 if f.n.get() == 0 => Opcode::SkipEqReg { x: f.x, y: f.y },
            0x6 => Opcode::LoadImm { x: f.x, nn: f.nn },
            0x7 => Opcode::AddImm { x: f.x, nn: f.nn },
            0x8 => Self::decode_alu(word, f),
            0x9 if f.n.get() == 0 => Opcode::SkipNeReg { x: f.x, y: f.y },
            0xA => Opcode::LoadIndex { nnn: f.nnn },
            0xB => Opcode::JumpWithOffset { nnn: f.nnn },
            0xC => Opcode::Random { x: f.x, nn: f.nn },
            0xD => Opcode::Draw {
                x: f.x,
                y: f.y,
                n: f.n,
            },
            0xE => Self::decode_key(word, f),
            0xF => Self::decode_misc(word, f),
            _ => Opcode::Unknown(word),
        }
    }

    /// Group 0: only 00E0 and 00EE exist, the upper byte must be zero.
    fn decode_system(word: u16) -> Self {
        match word {
            0x00E0 => Opcode::ClearDisplay,
            0x00EE => Opcode::Return,
            _ => Opcode::Unknown(word),
        }
    }

    fn decode_alu(word: u16, f: Fields) -> Self {
        let op = match f.n.get() {
            0x0 => AluOp::Set,
            0x1 => AluOp::Or,
            0x2 => AluOp::And,
            0x3 => AluOp::Xor,
            0x4 => AluOp::Add,
            0x5 => AluOp::Sub,
            0x6 => AluOp::ShiftRight,
            0x7 => AluOp::SubReverse,
            0xE => AluOp::ShiftLeft,
            _ => return Opcode::Unknown(word),
        };

        Opcode::Alu { x: f.x, y: f.y, op }
    }

    fn decode_key(word: u16, f: Fields) -> Self {
        match f.nn {
            0x9E => Opcode::SkipKeyPressed { x: f.x },
            0xA1 => Opcode::SkipKeyNotPressed { x: f.x },
            _ => Opcode::Unknown(word),
        }
    }

    fn decode_misc(word: u16, f: Fields) -> Self {
        let x = f.x;

        match f.nn {
            0x07 => Opcode::ReadDelay { x },
            0x0A => Opcode::WaitKey { x },
            0x15 => Opcode::SetDelay { x },
            0x18 => Opcode::SetSound { x },
            0x1E => Opcode::AddIndex { x },
            0x29 => Opcode::FontGlyph { x },
            0x33 => Opcode::Bcd { x },
            0x55 => Opcode::StoreRegs { x },
            0x65 => Opcode::LoadRegs { x },
            _ => Opcode::Unknown(word),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Opcode::ClearDisplay => write!(f, "CLS"),
            Opcode::Return => write!(f, "RET"),
            Opcode::Jump { nnn } => write!(f, "JP {nnn:#05X}"),
            Opcode::JumpWithOffset { nnn } => write!(f, "JP V0, {nnn:#05X}"),
            Opcode::Call { nnn } => write!(f, "CALL {nnn:#05X}"),
            Opcode::SkipEqImm { x, nn } => write!(f, "SE V{x}, {nn:#04X}"),
            Opcode::SkipNeImm { x, nn } => write!(f, "SNE V{x}, {nn:#04X}"),
            Opcode::SkipEqReg { x, y } => write!(f, "SE V{x}, V{y}"),
            Opcode::SkipNeReg { x, y } => write!(f, "SNE V{x}, V{y}"),
            Opcode::LoadImm { x, nn } => write!(f, "LD V{x}, {nn:#04X}"),
            Opcode::AddImm { x, nn } => write!(f, "ADD V{x}, {nn:#04X}"),
            Opcode::Alu { x, y, op } => {
                let mnemonic = match op {
                    AluOp::Set => "LD",
                    AluOp::Or => "OR",
                    AluOp::And => "AND",
                    AluOp::Xor => "XOR",
                    AluOp::Add => "ADD",
                    AluOp::Sub => "SUB",
                    AluOp::ShiftRight => "SHR",
                    AluOp::SubReverse => "SUBN",
                    AluOp::ShiftLeft => "SHL",
                };
                write!(f, "{mnemonic} V{x}, V{y}")
            }
            Opcode::LoadIndex { nnn } => write!(f, "LD I, {nnn:#05X}"),
            Opcode::AddIndex { x } => write!(f, "ADD I, V{x}"),
            Opcode::Random { x, nn } => write!(f, "RND V{x}, {nn:#04X}"),
            Opcode::Draw { x, y, n } => write!(f, "DRW V{x}, V{y}, {}", n.get()),
            Opcode::SkipKeyPressed { x } => write!(f, "SKP V{x}"),
            Opcode::SkipKeyNotPressed { x } => write!(f, "SKNP V{x}"),
            Opcode::WaitKey { x } => write!(f, "LD V{x}, K"),
            Opcode::ReadDelay { x } => write!(f, "LD V{x}, DT"),
            Opcode::SetDelay { x } => write!(f, "LD DT, V{x}"),
            Opcode::SetSound { x } => write!(f, "LD ST, V{x}"),
            Opcode::FontGlyph { x } => write!(f, "LD F, V{x}"),
            Opcode::Bcd { x } => write!(f, "LD B, V{x}"),
            Opcode::StoreRegs { x } => write!(f, "LD [I], V{x}"),
            Opcode::LoadRegs { x } => write!(f, "LD V{x}, [I]"),
            Opcode::Unknown(word) => write!(f, "DW {word:#06X}"),
        }
    }
}

/// Disassemble a program image, one entry per instruction word.
///
/// `origin` is the address the first byte is loaded at. A trailing odd byte is ignored.
pub fn disassemble(program: &[u8], origin: u16) -> Vec<(u16, u16, Opcode)> {
    program
        .chunks_exact(2)
        .enumerate()
        .map(|(idx, pair)| {
            let word = u16::from_be_bytes([pair[0], pair[1]]);
            let addr = origin.wrapping_add(idx as u16 * 2);
            (addr, word, Opcode::decode(word))
        })
        .collect()
}
