use crate::{Chip8Error, Interpreter, Machine, StepResult, TimerMode, u4};

pub const DEFAULT_CPU_HZ: f32 = 700.0;
pub const TIMER_HZ: f32 = 60.0;

const TIMER_TIME_STEP: f32 = 1.0 / TIMER_HZ;

/// Paces a [`Machine`] and [`Interpreter`] against elapsed wall time.
///
/// Timers are ticked here at 60Hz only when the interpreter is configured with
/// [`TimerMode::External`]; otherwise every step ticks them.
pub struct Runner {
    machine: Machine,
    interpreter: Interpreter,
    cpu_time_step: f32,
    cpu_dt_accumulator: f32,
    timer_dt_accumulator: f32,
}

impl Runner {
    pub fn new(machine: Machine, interpreter: Interpreter) -> Self {
        Self::with_cpu_hz(machine, interpreter, DEFAULT_CPU_HZ)
    }

    pub fn with_cpu_hz(machine: Machine, interpreter: Interpreter, cpu_hz: f32) -> Self {
        Self {
            machine,
            interpreter,
            cpu_time_step: 1.0 / cpu_hz,
            cpu_dt_accumulator: 0.0,
            timer_dt_accumulator: 0.0,
        }
    }

    /// Advance the emulator by `dt` seconds.
    ///
    /// Runs as many steps as fit in the elapsed time and returns early with
    /// `WaitForNextFrame` once a step asks for a redraw.
    pub fn update(&mut self, dt: f32) -> Result<StepResult, Chip8Error> {
        self.cpu_dt_accumulator += dt;

        if self.interpreter.config().timer_mode == TimerMode::External {
            self.timer_dt_accumulator += dt;
            while self.timer_dt_accumulator >= TIMER_TIME_STEP {
                self.timer_dt_accumulator -= TIMER_TIME_STEP;
                self.machine.tick_timers();
            }
        }

        while self.cpu_dt_accumulator >= self.cpu_time_step {
            self.cpu_dt_accumulator -= self.cpu_time_step;

            if self.interpreter.step(&mut self.machine)? == StepResult::WaitForNextFrame {
                // Drop the remaining time so the next frame doesn't try to catch up.
                self.cpu_dt_accumulator = 0.0;
                return Ok(StepResult::WaitForNextFrame);
            }
        }

        Ok(StepResult::Continue)
    }

    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.machine.set_key(key, pressed)
    }

    pub fn should_beep(&self) -> bool {
        self.machine.should_beep()
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    // 0x200: ADD V0, 1 ; 0x202: JP 0x200
    const COUNTER: [u8; 4] = [0x70, 0x01, 0x12, 0x00];

    #[test]
    fn runs_steps_for_elapsed_time() {
        let machine = Machine::with_program(&COUNTER).unwrap();
        let mut runner = Runner::with_cpu_hz(machine, Interpreter::default(), 100.0);

        assert_eq!(runner.update(0.105).unwrap(), StepResult::Continue);
        // 10 steps: five adds, five jumps
        assert_eq!(runner.machine().v()[0], 5);
    }

    #[test]
    fn stops_batch_on_redraw() {
        // CLS ; JP 0x200
        let machine = Machine::with_program(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        let mut runner = Runner::with_cpu_hz(machine, Interpreter::default(), 100.0);

        assert_eq!(runner.update(1.0).unwrap(), StepResult::WaitForNextFrame);
        assert_eq!(runner.machine().pc(), 0x202);
    }

    #[test]
    fn ticks_timers_at_60hz_in_external_mode() {
        let mut machine = Machine::with_program(&COUNTER).unwrap();
        machine.delay_timer = 100;
        let config = Config::default().with_timer_mode(TimerMode::External);
        let mut runner = Runner::with_cpu_hz(machine, Interpreter::new(config), 100.0);

        runner.update(0.51).unwrap();
        assert_eq!(runner.machine().delay_timer(), 70);
    }

    #[test]
    fn surfaces_step_errors() {
        let machine = Machine::with_program(&[0x00, 0xEE]).unwrap();
        let mut runner = Runner::new(machine, Interpreter::default());
        assert_eq!(
            runner.update(1.0),
            Err(Chip8Error::StackUnderflow { pc: 0x200 })
        );
    }
}
