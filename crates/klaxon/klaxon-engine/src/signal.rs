//! Per-worker terminate flag with a wake-up channel.
//!
//! The flag is raised by the command thread while it holds write access to
//! the registry, so raising must not take any lock. Waking happens afterwards,
//! once write access is released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
pub(crate) struct WorkerSignal {
    terminate: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl WorkerSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the terminate flag. Monotonic: there is no way to clear it.
    pub(crate) fn raise(&self) {
        self.terminate.store(true, Ordering::Release);
    }

    pub(crate) fn is_raised(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// Wakes the worker if it is parked in [`wait`](Self::wait).
    pub(crate) fn notify(&self) {
        let _lock = self.lock.lock();
        self.wake.notify_all();
    }

    /// Parks for at most `timeout`, returning early on [`notify`](Self::notify).
    ///
    /// The flag is re-checked under the lock, so a raise + notify that races
    /// with entering the wait is never lost.
    pub(crate) fn wait(&self, timeout: Duration) {
        let mut lock = self.lock.lock();
        if !self.is_raised() {
            self.wake.wait_for(&mut lock, timeout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn wait_returns_without_notify() {
        let signal = WorkerSignal::new();
        signal.wait(Duration::from_millis(20));
        assert!(!signal.is_raised());
    }

    #[test]
    fn notify_cuts_the_wait_short() {
        let signal = Arc::new(WorkerSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let start = Instant::now();
                signal.wait(Duration::from_secs(30));
                start.elapsed()
            })
        };

        thread::sleep(Duration::from_millis(20));
        signal.raise();
        signal.notify();

        assert!(waiter.join().unwrap() < Duration::from_secs(30));
        assert!(signal.is_raised());
    }

    #[test]
    fn raised_signal_does_not_wait() {
        let signal = WorkerSignal::new();
        signal.raise();
        let start = Instant::now();
        signal.wait(Duration::from_secs(30));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
