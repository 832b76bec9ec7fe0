use rand::{SeedableRng, rngs::StdRng};

use crate::machine::MEMORY_SIZE;
use crate::{Chip8Error, Config, Machine, Opcode, StepResult, TimerMode};

/// Executes CHIP-8 instructions against a [`Machine`].
///
/// The interpreter holds no architectural state of its own, only its
/// configuration and the random source used by `Cxnn`. The same interpreter
/// can drive any number of machines, one step at a time.
pub struct Interpreter {
    pub(crate) config: Config,
    pub(crate) rng: StdRng,
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self { config, rng }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Puts `machine` back into its power-on state.
    pub fn reset(&mut self, machine: &mut Machine) {
        machine.reset();
        log::debug!("machine reset, pc = {:#05X}", machine.pc);
    }

    /// Executes a single instruction (fetch, decode, execute) and then, in
    /// [`TimerMode::PerStep`], ticks the timers.
    ///
    /// On error the program counter is left on the faulting instruction.
    pub fn step(&mut self, machine: &mut Machine) -> Result<StepResult, Chip8Error> {
        let pc = machine.pc;
        machine.display_changed = false;

        let word = Self::fetch(machine)?;
        machine.current_opcode = word;

        let opcode = Opcode::decode(word);
        log::trace!("{pc:#05X}: {word:04X}  {opcode}");

        machine.pc = pc.wrapping_add(2);
        let result = self.execute(machine, opcode, pc).inspect_err(|_| {
            machine.pc = pc;
        })?;

        if self.config.timer_mode == TimerMode::PerStep {
            machine.tick_timers();
        }

        Ok(result)
    }

    /// Fetches the 16-bit instruction word at pc, high byte first.
    fn fetch(machine: &Machine) -> Result<u16, Chip8Error> {
        let pc = machine.pc;
        if pc as usize + 1 >= MEMORY_SIZE {
            return Err(Chip8Error::OutOfBoundsFetch { pc });
        }

        let high = machine.memory[pc as usize];
        let low = machine.memory[pc as usize + 1];

        Ok(u16::from_be_bytes([high, low]))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
