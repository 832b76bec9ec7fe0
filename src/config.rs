/// What the interpreter does when it decodes an instruction it doesn't know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// Fail the step with [`Chip8Error::UnknownOpcode`](crate::Chip8Error::UnknownOpcode).
    #[default]
    Strict,
    /// Log a warning and carry on with the next instruction.
    Lenient,
}

/// Which register the 8xy6 / 8xyE shifts read their operand from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShiftSource {
    /// Shift Vx in place (CHIP-48 / SUPER-CHIP behaviour).
    #[default]
    Vx,
    /// Shift Vy into Vx (original COSMAC VIP behaviour).
    Vy,
}

/// Who decrements the delay and sound timers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimerMode {
    /// Every interpreter step decrements both timers once.
    #[default]
    PerStep,
    /// The driver calls [`Machine::tick_timers`](crate::Machine::tick_timers) itself,
    /// normally at 60Hz.
    External,
}

/// Interpreter configuration and compatibility toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub unknown_opcode: UnknownOpcodePolicy,
    pub shift_source: ShiftSource,
    /// Clear VF after 8xy1, 8xy2 and 8xy3.
    pub logic_resets_flag: bool,
    pub timer_mode: TimerMode,
    /// Seed for the Cxnn random source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Config {
    pub fn with_unknown_opcode(mut self, policy: UnknownOpcodePolicy) -> Self {
        self.unknown_opcode = policy;
        self
    }

    pub fn with_shift_source(mut self, source: ShiftSource) -> Self {
        self.shift_source = source;
        self
    }

    pub fn with_logic_resets_flag(mut self, enabled: bool) -> Self {
        self.logic_resets_flag = enabled;
        self
    }

    pub fn with_timer_mode(mut self, mode: TimerMode) -> Self {
        self.timer_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
