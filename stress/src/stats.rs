use std::fmt;
use std::ops::Add;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::utils::CachePadded;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Reader,
    Writer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Reader => write!(f, "reader"),
            Role::Writer => write!(f, "writer"),
        }
    }
}

/// Counters for a single task.
///
/// Every counter is written only by the task that owns the block, so an increment is a plain
/// load and store rather than a read-modify-write. Other threads may read at any time and observe
/// some earlier value, never a value that was not reached.
#[derive(Debug)]
pub struct ThreadStats {
    id: usize,
    role: Role,
    ops: AtomicUsize,
    successes: AtomicUsize,
    failures: AtomicUsize,
    misses: AtomicUsize,
    mismatches: AtomicUsize,
}

/// A statistics block aligned and padded to its own cache line.
pub type PaddedStats = CachePadded<ThreadStats>;

impl ThreadStats {
    pub fn new(role: Role, id: usize) -> Self {
        Self {
            id,
            role,
            ops: AtomicUsize::new(0),
            successes: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            mismatches: AtomicUsize::new(0),
        }
    }

    /// Allocates `count` padded blocks with ids `0..count`. The blocks are never reallocated.
    pub fn allocate(role: Role, count: usize) -> Box<[PaddedStats]> {
        (0..count)
            .map(|id| CachePadded::new(Self::new(role, id)))
            .collect()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn record_op(&self) {
        bump(&self.ops);
    }

    pub fn record_success(&self) {
        bump(&self.successes);
    }

    pub fn record_failure(&self) {
        bump(&self.failures);
    }

    pub fn record_miss(&self) {
        bump(&self.misses);
    }

    pub fn record_mismatch(&self) {
        bump(&self.mismatches);
    }

    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ops: self.ops.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            mismatches: self.mismatches.load(Ordering::Relaxed),
        }
    }
}

#[inline(always)]
fn bump(counter: &AtomicUsize) {
    counter.store(counter.load(Ordering::Relaxed) + 1, Ordering::Relaxed);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub ops: usize,
    pub successes: usize,
    pub failures: usize,
    pub misses: usize,
    pub mismatches: usize,
}

impl Add for StatsSnapshot {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            ops: self.ops + other.ops,
            successes: self.successes + other.successes,
            failures: self.failures + other.failures,
            misses: self.misses + other.misses,
            mismatches: self.mismatches + other.mismatches,
        }
    }
}

impl std::iter::Sum for StatsSnapshot {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
