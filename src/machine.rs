use crate::font::{FONT, FONT_END_ADDRESS, FONT_START_ADDRESS};
use crate::{Chip8Error, DISPLAY_X, DISPLAY_Y, Display, u4};

// The constants are specified by the CHIP-8 architecture
pub const PROGRAM_START_ADDRESS: usize = 0x200;
pub const MEMORY_SIZE: usize = 4096;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START_ADDRESS;
pub const STACK_DEPTH: usize = 16;

/// CHIP-8 machine state.
///
/// Holds every piece of architectural state and nothing else. It is mutated by
/// [`Interpreter`](crate::Interpreter) and, for the keypad, by the input driver.
#[derive(Clone)]
pub struct Machine {
    /// 4KB memory array
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// Display buffer: 64x32 monochrome pixels, indexed `[y][x]`
    pub(crate) display: Display<bool>,

    /// Program counter: address of the next instruction to execute
    pub(crate) pc: u16,
    /// Index register: used for memory operations
    pub(crate) i: u16,
    /// General-purpose registers V0-VF (VF is used as a flag register)
    pub(crate) v: [u8; 16],
    /// Return addresses, `stack[..sp]` is live
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) sp: usize,

    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,

    /// Keypad state: 16 keys mapped as booleans (true = pressed)
    pub(crate) keypad: [bool; 16],

    /// The last fetched instruction word
    pub(crate) current_opcode: u16,
    /// Whether the last step touched the display
    pub(crate) display_changed: bool,
}

impl Machine {
    /// Creates a machine in its reset state.
    pub fn new() -> Self {
        let mut machine = Machine {
            memory: [0; MEMORY_SIZE],
            display: [[false; DISPLAY_X]; DISPLAY_Y],
            pc: 0,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; 16],
            current_opcode: 0,
            display_changed: false,
        };
        machine.reset();
        machine
    }

    /// Creates a reset machine with `program` loaded at 0x200.
    pub fn with_program(program: &[u8]) -> Result<Self, Chip8Error> {
        let mut machine = Self::new();
        machine.load_program(program)?;
        Ok(machine)
    }

    /// Restores the power-on state: everything zeroed, font installed, pc at 0x200.
    pub fn reset(&mut self) {
        self.memory.fill(0);
        self.memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);
        self.display = [[false; DISPLAY_X]; DISPLAY_Y];

        self.pc = PROGRAM_START_ADDRESS as u16;
        self.i = 0;
        self.v = [0; 16];
        self.stack = [0; STACK_DEPTH];
        self.sp = 0;

        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keypad = [false; 16];

        self.current_opcode = 0;
        self.display_changed = false;
    }

    /// Copies a program image into memory at 0x200.
    ///
    /// Images larger than the space above 0x200 are rejected and leave memory untouched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }

        let end = PROGRAM_START_ADDRESS + program.len();
        self.memory[PROGRAM_START_ADDRESS..end].copy_from_slice(program);
        log::debug!("loaded {} byte program at {PROGRAM_START_ADDRESS:#05X}", program.len());

        Ok(())
    }

    /// Decrements the delay and sound timers by one, stopping at zero.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    pub fn keypad(&self) -> &[bool; 16] {
        &self.keypad
    }

    /// Returns true if the sound timer is running, meaning a tone should play.
    pub fn should_beep(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn display(&self) -> &Display<bool> {
        &self.display
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.display[y][x]
    }

    /// Whether the most recent step cleared or drew to the display.
    pub fn display_changed(&self) -> bool {
        self.display_changed
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    /// The live portion of the call stack, oldest return address first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn current_opcode(&self) -> u16 {
        self.current_opcode
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    /// Memory byte at `addr`, wrapping around the 4KB address space.
    pub(crate) fn read(&self, addr: u16) -> u8 {
        self.memory[addr as usize % MEMORY_SIZE]
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize % MEMORY_SIZE] = value;
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_machine_is_reset() {
        let m = Machine::new();
        assert_eq!(m.pc(), 0x200);
        assert_eq!(m.sp(), 0);
        assert_eq!(m.i(), 0);
        assert_eq!(m.v(), &[0; 16]);
        assert_eq!(&m.memory()[0x50..0xA0], &FONT[..]);
        assert!(m.memory()[..0x50].iter().all(|&b| b == 0));
        assert!(m.memory()[0xA0..].iter().all(|&b| b == 0));
        assert!(m.display().iter().flatten().all(|&p| !p));
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = Machine::with_program(&[0x12, 0x34]).unwrap();
        m.v[3] = 9;
        m.i = 0x300;
        m.pc = 0x400;
        m.stack[0] = 0x202;
        m.sp = 1;
        m.delay_timer = 5;
        m.sound_timer = 6;
        m.keypad[4] = true;
        m.display[3][7] = true;
        m.current_opcode = 0x1234;
        m.display_changed = true;

        m.reset();

        assert_eq!(m.pc(), 0x200);
        assert_eq!(m.memory()[0x200], 0);
        assert_eq!(m.v()[3], 0);
        assert_eq!(m.i(), 0);
        assert!(m.stack().is_empty());
        assert_eq!((m.delay_timer(), m.sound_timer()), (0, 0));
        assert!(!m.keypad()[4]);
        assert!(!m.pixel(7, 3));
        assert_eq!(m.current_opcode(), 0);
        assert!(!m.display_changed());
        assert_eq!(&m.memory()[0x50..0xA0], &FONT[..]);
    }

    #[test]
    fn loads_largest_program() {
        let program = vec![0xAB; MAX_PROGRAM_SIZE];
        let m = Machine::with_program(&program).unwrap();
        assert_eq!(m.memory()[0x200], 0xAB);
        assert_eq!(m.memory()[0xFFF], 0xAB);
    }

    #[test]
    fn rejects_oversized_program_without_touching_memory() {
        let mut m = Machine::new();
        let program = vec![0xAB; MAX_PROGRAM_SIZE + 1];

        let err = m.load_program(&program).unwrap_err();

        assert_eq!(
            err,
            Chip8Error::ProgramTooLarge {
                size: 3585,
                max_size: 3584
            }
        );
        assert!(m.memory()[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn timers_clamp_at_zero() {
        let mut m = Machine::new();
        m.delay_timer = 1;
        m.sound_timer = 2;

        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (0, 1));
        assert!(m.should_beep());

        m.tick_timers();
        m.tick_timers();
        assert_eq!((m.delay_timer(), m.sound_timer()), (0, 0));
        assert!(!m.should_beep());
    }

    #[test]
    fn memory_access_wraps() {
        let mut m = Machine::new();
        m.write(0x1000, 0x42);
        assert_eq!(m.memory()[0], 0x42);
        assert_eq!(m.read(0x1000), 0x42);
    }
}
