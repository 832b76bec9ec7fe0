pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// A type alias for the CHIP-8 display buffer representation
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];

/// Outcome of a single interpreter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Continue executing instructions in the current frame.
    Continue,
    /// Wait for the next frame before continuing
    /// (the display changed, or the program is waiting for a key press).
    WaitForNextFrame,
}

/// Error types that can occur during CHIP-8 emulation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Chip8Error {
    #[error("Program is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("Unknown opcode {opcode:#06X} at address {pc:#05X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("Stack overflow: more than 16 nested calls at address {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("Stack underflow: return with empty call stack at address {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("Instruction fetch out of bounds at address {pc:#06X}")]
    OutOfBoundsFetch { pc: u16 },
}
