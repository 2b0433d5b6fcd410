use std::{
    sync::{
        mpsc::{self, RecvTimeoutError, SyncSender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// The delay and the sound timer.
///
/// Both count down at 60 hertz until they reach 0. The counting is driven
/// from the outside by calling [`Timers::tick`], apart from that only the
/// timer opcodes touch them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timers {
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub delay: u8,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    pub sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will count both timers down by one, a timer at zero stays there.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// The sound shall be played as long as the sound timer is running.
    pub fn is_sounding(&self) -> bool {
        self.sound > 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Converts a frequency into the interval between two calls.
pub fn interval(hertz: u64) -> Duration {
    Duration::from_nanos(1_000_000_000 / hertz.max(1))
}

/// Runs a callback periodically on its own thread.
pub trait TimedWorker {
    /// Will initialize the new worker.
    fn new() -> Self;
    /// Will start the worker that will run the callback function
    /// every interval.
    fn start<T>(&mut self, callback: T, interval: Duration)
    where
        T: Send + FnMut() + 'static;
    /// Will stop the worker.
    fn stop(&mut self);
    /// Checks if the thread is alive.
    fn is_alive(&self) -> bool;
}

/// Is the internal worker, that exists on the
/// second thread.
pub struct Worker {
    /// Contains the actuall thread, that is running.
    thread: Option<JoinHandle<()>>,
    /// Contains the sync sender used to gracefull shutdown the thread.
    shutdown: Option<SyncSender<()>>,
    /// Counts the threads holding a copy, more then one means the
    /// worker thread is still running.
    alive: Arc<()>,
}

impl TimedWorker for Worker {
    fn new() -> Self {
        Self {
            thread: None,
            shutdown: None,
            alive: Arc::new(()),
        }
    }

    /// Attention the timer assumes the callback will finish
    /// calculation faster then the interval.
    fn start<T>(&mut self, mut callback: T, interval: Duration)
    where
        T: Send + FnMut() + 'static,
    {
        // a running worker is replaced
        self.stop();

        let (send, recv) = mpsc::sync_channel::<()>(1);
        let alive = self.alive.clone();
        let thread = thread::spawn(move || {
            let _alive = alive;
            let mut timeout = interval;
            loop {
                match recv.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        let start = Instant::now();

                        callback();

                        // make sure there the system will at most wait the interval
                        timeout = interval.checked_sub(start.elapsed()).unwrap_or_default();
                    }
                    Ok(_) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        self.thread = Some(thread);
        self.shutdown = Some(send);
    }

    fn stop(&mut self) {
        // Will stop the worker, in two steps one by sending an empty message
        // and second by droping the only sender for the given receiver.
        if let Some(sender) = self.shutdown.take() {
            // the thread might already be gone, which is the goal anyway
            let _ = sender.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("The worker thread panicked.");
            }
        }
    }

    fn is_alive(&self) -> bool {
        Arc::strong_count(&self.alive) > 1
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}
