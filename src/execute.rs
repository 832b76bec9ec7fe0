use rand::Rng;

use crate::font::glyph_address;
use crate::machine::STACK_DEPTH;
use crate::{
    AluOp, Chip8Error, DISPLAY_X, DISPLAY_Y, Interpreter, Machine, Opcode, ShiftSource,
    StepResult, UnknownOpcodePolicy, u4,
};

impl Interpreter {
    /// Runs one decoded instruction. `machine.pc` has already been advanced past it;
    /// `pc` is the instruction's own address.
    pub(crate) fn execute(
        &mut self,
        m: &mut Machine,
        opcode: Opcode,
        pc: u16,
    ) -> Result<StepResult, Chip8Error> {
        match opcode {
            Opcode::ClearDisplay => {
                m.display = [[false; DISPLAY_X]; DISPLAY_Y];
                m.display_changed = true;
                return Ok(StepResult::WaitForNextFrame);
            }
            Opcode::Return => {
                if m.sp == 0 {
                    return Err(Chip8Error::StackUnderflow { pc });
                }
                m.sp -= 1;
                m.pc = m.stack[m.sp];
            }
            Opcode::Jump { nnn } => {
                m.pc = nnn;
            }
            Opcode::JumpWithOffset { nnn } => {
                m.pc = nnn + u16::from(m.v[0]);
            }
            Opcode::Call { nnn } => {
                if m.sp == STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow { pc });
                }
                m.stack[m.sp] = m.pc;
                m.sp += 1;
                m.pc = nnn;
            }
            Opcode::SkipEqImm { x, nn } => skip_if(&mut m.pc, m.v[x] == nn),
            Opcode::SkipNeImm { x, nn } => skip_if(&mut m.pc, m.v[x] != nn),
            Opcode::SkipEqReg { x, y } => skip_if(&mut m.pc, m.v[x] == m.v[y]),
            Opcode::SkipNeReg { x, y } => skip_if(&mut m.pc, m.v[x] != m.v[y]),
            Opcode::LoadImm { x, nn } => {
                m.v[x] = nn;
            }
            Opcode::AddImm { x, nn } => {
                m.v[x] = m.v[x].wrapping_add(nn);
            }
            Opcode::Alu { x, y, op } => {
                self.execute_alu(m, x, y, op);
            }
            Opcode::LoadIndex { nnn } => {
                m.i = nnn;
            }
            Opcode::AddIndex { x } => {
                m.i = m.i.wrapping_add(m.v[x].into()) & 0x0FFF;
            }
            Opcode::Random { x, nn } => {
                let byte: u8 = self.rng.random();
                m.v[x] = byte & nn;
            }
            Opcode::Draw { x, y, n } => {
                execute_draw(m, x, y, n);
                return Ok(StepResult::WaitForNextFrame);
            }
            Opcode::SkipKeyPressed { x } => {
                let key = u4::from_low_bits(m.v[x]);
                skip_if(&mut m.pc, m.keypad[key]);
            }
            Opcode::SkipKeyNotPressed { x } => {
                let key = u4::from_low_bits(m.v[x]);
                skip_if(&mut m.pc, !m.keypad[key]);
            }
            Opcode::WaitKey { x } => {
                return Ok(execute_wait_key(m, x, pc));
            }
            Opcode::ReadDelay { x } => {
                m.v[x] = m.delay_timer;
            }
            Opcode::SetDelay { x } => {
                m.delay_timer = m.v[x];
            }
            Opcode::SetSound { x } => {
                m.sound_timer = m.v[x];
            }
            Opcode::FontGlyph { x } => {
                m.i = glyph_address(m.v[x]);
            }
            Opcode::Bcd { x } => {
                let value = m.v[x];
                m.write(m.i, value / 100);
                m.write(m.i.wrapping_add(1), (value / 10) % 10);
                m.write(m.i.wrapping_add(2), value % 10);
            }
            Opcode::StoreRegs { x } => {
                for reg in 0..=usize::from(x) {
                    m.write(m.i.wrapping_add(reg as u16), m.v[reg]);
                }
            }
            Opcode::LoadRegs { x } => {
                for reg in 0..=usize::from(x) {
                    m.v[reg] = m.read(m.i.wrapping_add(reg as u16));
                }
            }
            Opcode::Unknown(opcode) => match self.config.unknown_opcode {
                UnknownOpcodePolicy::Strict => {
                    return Err(Chip8Error::UnknownOpcode { opcode, pc });
                }
                UnknownOpcodePolicy::Lenient => {
                    log::warn!("skipping unknown opcode {opcode:#06X} at {pc:#05X}");
                }
            },
        };

        Ok(StepResult::Continue)
    }

    // Every arm computes the result and flag from the operands before writing,
    // so that x == 0xF still ends with the flag in VF.
    fn execute_alu(&self, m: &mut Machine, x: u4, y: u4, op: AluOp) {
        let (vx, vy) = (m.v[x], m.v[y]);
        let shift_operand = match self.config.shift_source {
            ShiftSource::Vx => vx,
            ShiftSource::Vy => vy,
        };

        let (result, flag) = match op {
            AluOp::Set => (vy, None),
            AluOp::Or => (vx | vy, self.logic_flag()),
            AluOp::And => (vx & vy, self.logic_flag()),
            AluOp::Xor => (vx ^ vy, self.logic_flag()),
            AluOp::Add => {
                let (sum, carry) = vx.overflowing_add(vy);
                (sum, Some(carry as u8))
            }
            // VF is set only when the minuend is strictly larger
            AluOp::Sub => (vx.wrapping_sub(vy), Some((vx > vy) as u8)),
            AluOp::SubReverse => (vy.wrapping_sub(vx), Some((vy > vx) as u8)),
            AluOp::ShiftRight => (shift_operand >> 1, Some(shift_operand & 1)),
            AluOp::ShiftLeft => (shift_operand << 1, Some(shift_operand >> 7)),
        };

        m.v[x] = result;
        if let Some(flag) = flag {
            m.v[0xF] = flag;
        }
    }

    fn logic_flag(&self) -> Option<u8> {
        self.config.logic_resets_flag.then_some(0)
    }
}

fn skip_if(pc: &mut u16, condition: bool) {
    if condition {
        *pc = pc.wrapping_add(2);
    }
}

/// XORs an n-row sprite from memory at I onto the display.
///
/// The origin wraps onto the screen, rows past the bottom wrap to the top and
/// pixels past the right edge are dropped.
fn execute_draw(m: &mut Machine, x: u4, y: u4, n: u4) {
    let x_pos = m.v[x] as usize % DISPLAY_X;
    let y_pos = m.v[y] as usize % DISPLAY_Y;
    let col_count = std::cmp::min(8, DISPLAY_X - x_pos);

    let mut any_erased = false;
    for row in 0..usize::from(n) {
        let sprite_byte = m.read(m.i.wrapping_add(row as u16));
        let line = &mut m.display[(y_pos + row) % DISPLAY_Y];

        for col in 0..col_count {
            if sprite_byte & (0x80 >> col) != 0 {
                let pixel = &mut line[x_pos + col];
                any_erased |= *pixel;
                *pixel = !*pixel;
            }
        }
    }

    m.v[0xF] = any_erased as u8;
    m.display_changed = true;
}

/// Stores the lowest pressed key in Vx, or rewinds pc so this instruction runs again.
fn execute_wait_key(m: &mut Machine, x: u4, pc: u16) -> StepResult {
    match m.keypad.iter().position(|&pressed| pressed) {
        Some(key) => {
            m.v[x] = key as u8;
            StepResult::Continue
        }
        None => {
            m.pc = pc;
            StepResult::WaitForNextFrame
        }
    }
}
