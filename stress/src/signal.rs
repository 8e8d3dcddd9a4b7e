use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A cooperative stop flag shared by the orchestrator, its tasks and whoever may interrupt the
/// run. Tasks poll [`StopSignal::is_stopped`]; the reporting loop sleeps in
/// [`StopSignal::wait_timeout`] and wakes as soon as the signal is raised.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    inner: Arc<StopInner>,
}

#[derive(Debug, Default)]
struct StopInner {
    stopped: AtomicBool,
    lock: Mutex<()>,
    condvar: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::Release);
        let _guard = self.inner.lock.lock();
        self.inner.condvar.notify_all();
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Sleeps for `timeout` or until the signal is raised. Returns whether the signal is raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.inner.lock.lock();

        while !self.is_stopped() {
            if self.inner.condvar.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }

        self.is_stopped()
    }
}

/// Holds spawned tasks back until every task of the run has been created, so that a failure to
/// spawn aborts the run before any work begins.
#[derive(Debug, Default)]
pub struct StartGate {
    open: AtomicBool,
}

impl StartGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    /// Waits for the gate to open. Returns `false` if the run was stopped first.
    pub fn wait(&self, stop: &StopSignal) -> bool {
        loop {
            if stop.is_stopped() {
                return false;
            }
            if self.open.load(Ordering::Acquire) {
                return true;
            }
            thread::yield_now();
        }
    }
}
