use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::utils::CachePadded;

/// Counts confirmed insertions across all writers. It only ever grows.
///
/// Writers advance the cursor after the store acknowledged an insert, so a reader that observes a
/// bound of `n` knows at least `n` inserts completed. Reads use acquire ordering to pair with the
/// release increment.
#[derive(Debug, Default)]
pub struct InsertionCursor {
    total_inserted: CachePadded<AtomicUsize>,
}

impl InsertionCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self) {
        self.total_inserted.fetch_add(1, Ordering::Release);
    }

    pub fn total_inserted(&self) -> usize {
        self.total_inserted.load(Ordering::Acquire)
    }

    /// The exclusive upper bound of pool indices a reader may sample. With several writers each
    /// inserting the whole pool the count runs past the pool length, so it is clamped.
    pub fn sample_bound(&self, pool_len: usize) -> usize {
        self.total_inserted().min(pool_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_cursor_counts_concurrent_advances() {
        let cursor = InsertionCursor::new();

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        cursor.advance();
                    }
                });
            }
        });

        assert_eq!(cursor.total_inserted(), 4000);
    }

    #[test]
    fn test_sample_bound_is_clamped_to_pool() {
        let cursor = InsertionCursor::new();

        assert_eq!(cursor.sample_bound(10), 0);

        for _ in 0..25 {
            cursor.advance();
        }

        assert_eq!(cursor.sample_bound(10), 10);
        assert_eq!(cursor.sample_bound(100), 25);
        assert_eq!(cursor.sample_bound(0), 0);
    }
}
