use {
    crate::definitions::timer,
    std::{
        sync::{
            atomic::{AtomicU8, Ordering},
            mpsc::{self, RecvTimeoutError, SyncSender},
            Arc,
        },
        thread::{self, JoinHandle},
        time::{Duration, Instant},
    },
};

/// A worker that calls the given callback once per interval
/// on its own thread, until it is stopped or the callback
/// asks to stop.
pub trait TimedWorker {
    fn new() -> Self;
    /// The callback returns `false` when the worker shall stop.
    fn start<T>(&mut self, callback: T, interval: Duration)
    where
        T: Send + FnMut() -> bool + 'static;
    fn stop(&mut self);
    fn is_alive(&self) -> bool;
}

/// Is the internal worker, that exists on the
/// second thread.
pub struct Worker {
    /// Contains the actuall thread, that is running.
    thread: Option<JoinHandle<()>>,
    /// Contains the sync sender used to gracefull shutdown the thread.
    shutdown: Option<SyncSender<()>>,
    /// Counts the actuall threads used, the thread holds a clone
    /// for as long as it runs.
    alive: Arc<()>,
}

impl TimedWorker for Worker {
    /// Will initialize the new worker.
    fn new() -> Self {
        Self {
            thread: None,
            shutdown: None,
            alive: Arc::new(()),
        }
    }

    /// Will start the worker that will run the callback function
    /// every interval.
    /// Attention the worker assumes the callback will finish
    /// faster then the interval.
    fn start<T>(&mut self, mut callback: T, interval: Duration)
    where
        T: Send + FnMut() -> bool + 'static,
    {
        let (send, recv) = mpsc::sync_channel::<()>(1);
        let alive = self.alive.clone();
        let thread = thread::spawn(move || {
            let _alive = alive;
            let mut timeout = interval;
            loop {
                match recv.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        let start = Instant::now();

                        if !callback() {
                            break;
                        }

                        // make sure the system will at most wait the interval
                        timeout = interval.saturating_sub(start.elapsed());
                    }
                    Ok(_) | Err(_) => break, // shutdown
                }
            }
        });

        self.thread = Some(thread);
        self.shutdown = Some(send);
    }

    /// Will stop the worker.
    fn stop(&mut self) {
        // The thread might have left already, so a failed send is fine,
        // dropping the sender afterwards disconnects the channel anyway.
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("The worker thread paniced.");
            }
        }
    }

    /// Checks if the thread is alive.
    fn is_alive(&self) -> bool {
        Arc::strong_count(&self.alive) > 1
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The counters shared between the chip and the ticking worker.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    delay: AtomicU8,
    sound: AtomicU8,
}

/// Decrements the counter by one, if it is above zero.
fn count_down(counter: &AtomicU8) {
    let _ = counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |val| val.checked_sub(1));
}

/// The delay and the sound timer. Both count down to zero at 60Hz, driven by a single worker
/// that runs independent of the instruction execution.
///
/// Delay timer: This timer is intended to be used for timing the events of games. Its value
/// can be set and read.
///
/// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
/// sound shall be made by the frontend.
pub struct Timers<W: TimedWorker> {
    counters: Arc<Counters>,
    worker: Option<W>,
}

/// A read only view on the timers, that can be handed to other threads.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    counters: Arc<Counters>,
}

impl TimerHandle {
    pub fn delay(&self) -> u8 {
        self.counters.delay.load(Ordering::Acquire)
    }

    pub fn sound(&self) -> u8 {
        self.counters.sound.load(Ordering::Acquire)
    }
}

impl<W: TimedWorker> Timers<W> {
    /// Creates the timers without starting the ticking worker.
    pub fn stopped() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            worker: None,
        }
    }

    /// Creates the timers and starts ticking at 60Hz.
    pub fn new() -> Self {
        let mut timers = Self::stopped();
        timers.start();
        timers
    }

    /// Starts the ticking worker, if it is not already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let counters = self.counters.clone();
        let callback = move || {
            count_down(&counters.delay);
            count_down(&counters.sound);
            true
        };
        let mut worker = W::new();
        worker.start(callback, timer::INTERVAL);
        self.worker = Some(worker);
    }

    /// Stops the ticking worker, the values are frozen afterwards.
    pub fn stop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().map_or(false, |worker| worker.is_alive())
    }

    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            counters: self.counters.clone(),
        }
    }

    /// A single 60Hz step for both timers.
    pub fn tick(&self) {
        count_down(&self.counters.delay);
        count_down(&self.counters.sound);
    }

    pub fn delay(&self) -> u8 {
        self.counters.delay.load(Ordering::Acquire)
    }

    pub fn set_delay(&self, value: u8) {
        self.counters.delay.store(value, Ordering::Release);
    }

    pub fn sound(&self) -> u8 {
        self.counters.sound.load(Ordering::Acquire)
    }

    pub fn set_sound(&self, value: u8) {
        self.counters.sound.store(value, Ordering::Release);
    }
}
