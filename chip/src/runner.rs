use std::sync::{
    atomic::{AtomicU16, Ordering},
    Arc,
};

use parking_lot::Mutex;

use crate::{
    chip8::Machine,
    devices::DisplayCommands,
    keyboard::Keys,
    opcode::Operation,
    timer::{TimedWorker, TimerHandle, Worker},
    ProcessError,
};

/// The handle on a running machine.
///
/// Dropping it cancels a pending key wait and stops the execution.
pub struct Runner<W: TimedWorker = Worker> {
    worker: W,
    keys: Arc<Keys>,
    timers: TimerHandle,
    program_counter: Arc<AtomicU16>,
    /// the error the execution stopped on
    error: Arc<Mutex<Option<ProcessError>>>,
}

/// Will start executing the machine on its own worker, at the frequency of the machine
/// configuration. Every time the framebuffer changed it is handed to the display.
pub fn run<D, W>(mut machine: Machine<W>, mut display: D) -> Runner<W>
where
    D: DisplayCommands + Send + 'static,
    W: TimedWorker + Send + 'static,
{
    let keys = machine.keys();
    let timers = machine.timer_handle();
    let interval = machine.config().instruction_interval();

    let program_counter = Arc::new(AtomicU16::new(machine.program_counter()));
    let error = Arc::new(Mutex::new(None));

    let inner_run = {
        let program_counter = program_counter.clone();
        let error = error.clone();
        move || {
            let result = machine.next();
            program_counter.store(machine.program_counter(), Ordering::Release);

            match result {
                Ok(Operation::Draw) => {
                    display.display(machine.display());
                    true
                }
                Ok(_) => true,
                Err(ProcessError::Interrupted) => {
                    log::info!("The execution was interrupted.");
                    *error.lock() = Some(ProcessError::Interrupted);
                    false
                }
                Err(err) => {
                    log::error!("The execution stopped: {}", err);
                    log::error!("{}", machine);
                    *error.lock() = Some(err);
                    false
                }
            }
        }
    };

    log::info!("Starting the execution with an interval of {:?}", interval);
    let mut worker = W::new();
    worker.start(inner_run, interval);

    Runner {
        worker,
        keys,
        timers,
        program_counter,
        error,
    }
}

impl<W: TimedWorker> Runner<W> {
    /// The handle the key presses are delivered to.
    pub fn keys(&self) -> Arc<Keys> {
        self.keys.clone()
    }

    pub fn timers(&self) -> &TimerHandle {
        &self.timers
    }

    /// The program counter after the last executed instruction.
    pub fn program_counter(&self) -> u16 {
        self.program_counter.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.worker.is_alive()
    }

    /// The error the execution stopped on, if it did.
    pub fn error(&self) -> Option<ProcessError> {
        self.error.lock().clone()
    }

    /// Will stop the execution, a pending key wait is released first.
    ///
    /// Returns the error the execution stopped on by itself, the interruption
    /// caused by stopping is not an error.
    pub fn stop(&mut self) -> Result<(), ProcessError> {
        self.keys.cancel();
        self.worker.stop();
        log::info!("Stopped the execution.");

        match self.error.lock().take() {
            None | Some(ProcessError::Interrupted) => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl<W: TimedWorker> Drop for Runner<W> {
    fn drop(&mut self) {
        self.keys.cancel();
        self.worker.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::AtomicUsize,
        thread,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::{
        definitions::{cpu, Config},
        devices::MockDisplayCommands,
        StackError,
    };

    fn machine(rom: &[u8]) -> Machine<Worker> {
        let config = Config {
            frequency: 1000,
            ..Config::default()
        };
        let mut machine = Machine::new(config);
        machine.load_rom(rom).unwrap();
        machine
    }

    fn wait_until<F: Fn() -> bool>(cond: F) {
        let start = Instant::now();
        while !cond() {
            assert!(
                start.elapsed() < Duration::from_secs(5),
                "condition not reached in time"
            );
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_draw_reaches_display() {
        let drawn = Arc::new(AtomicUsize::new(0));
        let mut display = MockDisplayCommands::new();
        {
            let drawn = drawn.clone();
            display.expect_display().returning(move |_| {
                drawn.fetch_add(1, Ordering::SeqCst);
            });
        }

        // clear the screen and jump back
        let mut runner = run(machine(&[0x00, 0xE0, 0x12, 0x00]), display);
        wait_until(|| drawn.load(Ordering::SeqCst) >= 2);

        assert!(runner.is_alive());
        assert_eq!(Ok(()), runner.stop());
        assert!(!runner.is_alive());
    }

    #[test]
    fn test_stops_on_error() {
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        let mut runner = run(machine(&[0x00, 0xEE]), display);
        wait_until(|| !runner.is_alive());

        assert_eq!(Some(ProcessError::Stack(StackError::Empty)), runner.error());
        assert_eq!(Err(ProcessError::Stack(StackError::Empty)), runner.stop());
    }

    #[test]
    fn test_stop_releases_key_wait() {
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        let mut runner = run(machine(&[0xF0, 0x0A]), display);
        let keys = runner.keys();
        wait_until(|| keys.is_waiting());

        assert_eq!(Ok(()), runner.stop());
        assert!(!runner.is_alive());
    }

    #[test]
    fn test_key_press_resumes() {
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        // wait for a key, then return with an empty stack
        let mut runner = run(machine(&[0xF0, 0x0A, 0x00, 0xEE]), display);
        let keys = runner.keys();
        wait_until(|| keys.is_waiting());
        assert_eq!(cpu::PROGRAM_COUNTER, runner.program_counter());

        keys.press(0x3);
        wait_until(|| !runner.is_alive());
        assert_eq!(Err(ProcessError::Stack(StackError::Empty)), runner.stop());
    }
}
