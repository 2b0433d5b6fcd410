use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::Mutex;

use crate::{
    chip8::ChipSet,
    definitions::{cpu, timer},
    devices::{DisplaySurface, InputSource},
    timer::{interval, TimedWorker},
    Fault,
};

/// The clock rates the runner drives the machine with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Instructions executed per second
    pub cpu_hertz: u64,
    /// Timer decrements per second
    pub timer_hertz: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cpu_hertz: cpu::HERTZ,
            timer_hertz: timer::HERTZ,
        }
    }
}

/// The machine shared between the two workers and the host, a single lock
/// guards the whole machine.
pub type SharedChipSet<D, K> = Arc<Mutex<ChipSet<D, K>>>;

/// Drives a machine with two independent clocks, one executing instructions
/// and one counting the timers down.
pub struct Runner<D, K, W>
where
    D: DisplaySurface,
    K: InputSource,
    W: TimedWorker,
{
    chip: SharedChipSet<D, K>,
    fault: Arc<Mutex<Option<Fault>>>,
    halted: Arc<AtomicBool>,
    cpu: W,
    timers: W,
}

/// Will start executing the chip with the given clock rates.
pub fn run<D, K, W>(chip: ChipSet<D, K>, config: RunnerConfig) -> Runner<D, K, W>
where
    D: DisplaySurface + Send + 'static,
    K: InputSource + Send + 'static,
    W: TimedWorker,
{
    let chip = Arc::new(Mutex::new(chip));
    let fault = Arc::new(Mutex::new(None));
    let halted = Arc::new(AtomicBool::new(false));

    let mut cpu = W::new();
    {
        let chip = chip.clone();
        let fault = fault.clone();
        let halted = halted.clone();
        cpu.start(
            move || {
                if halted.load(Ordering::Acquire) {
                    return;
                }
                if let Err(err) = chip.lock().step() {
                    log::error!("halting after: {}", err);
                    *fault.lock() = Some(err);
                    halted.store(true, Ordering::Release);
                }
            },
            interval(config.cpu_hertz),
        );
    }

    let mut timers = W::new();
    {
        let chip = chip.clone();
        timers.start(move || chip.lock().tick(), interval(config.timer_hertz));
    }

    Runner {
        chip,
        fault,
        halted,
        cpu,
        timers,
    }
}

impl<D, K, W> Runner<D, K, W>
where
    D: DisplaySurface,
    K: InputSource,
    W: TimedWorker,
{
    /// The shared machine, lock it to read the display or to press keys.
    pub fn chip(&self) -> SharedChipSet<D, K> {
        self.chip.clone()
    }

    /// The fault that halted the instruction clock, if any.
    pub fn fault(&self) -> Option<Fault> {
        self.fault.lock().clone()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Will stop both clocks.
    pub fn stop(&mut self) {
        self.cpu.stop();
        self.timers.stop();
    }

    pub fn is_running(&self) -> bool {
        self.cpu.is_alive() || self.timers.is_alive()
    }
}

impl<D, K, W> Drop for Runner<D, K, W>
where
    D: DisplaySurface,
    K: InputSource,
    W: TimedWorker,
{
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;
    use crate::{
        devices::{Display, Keyboard},
        timer::Worker,
        ProcessError, StackError,
    };

    fn chip_with(program: &[u8]) -> ChipSet<Display, Keyboard> {
        let mut chip = ChipSet::new(Display::new(), Keyboard::new());
        chip.load_program(program).unwrap();
        chip
    }

    #[test]
    fn test_run_loop_and_timers() {
        // V0 = 0x20, delay = V0, loop forever
        let chip = chip_with(&[0x60, 0x20, 0xF0, 0x15, 0x12, 0x04]);
        let config = RunnerConfig {
            cpu_hertz: 1000,
            timer_hertz: 1000,
        };
        let mut runner: Runner<_, _, Worker> = run(chip, config);
        assert!(runner.is_running());

        thread::sleep(Duration::from_millis(200));
        runner.stop();
        assert!(!runner.is_running());

        let chip = runner.chip();
        let chip = chip.lock();
        assert_eq!(0x0204, chip.get_program_counter());
        assert_eq!(0x20, chip.get_registers()[0]);
        assert_eq!(0, chip.get_delay_timer());
        assert!(runner.fault().is_none());
        assert!(!runner.is_halted());
    }

    #[test]
    fn test_run_halts_on_fault() {
        // return with an empty stack
        let chip = chip_with(&[0x00, 0xEE]);
        let runner: Runner<_, _, Worker> = run(chip, RunnerConfig::default());

        thread::sleep(Duration::from_millis(100));
        assert!(runner.is_halted());

        let fault = runner.fault().expect("The return has to fault.");
        assert_eq!(0x0200, fault.pc);
        assert_eq!(Some(0x00EE), fault.opcode);
        assert_eq!(ProcessError::Stack(StackError::Empty), fault.source);
        assert_eq!(0x0200, runner.chip().lock().get_program_counter());
    }
}
