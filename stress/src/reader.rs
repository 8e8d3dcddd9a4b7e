use std::thread;

use kv_store::{Identity, Store};
use log::error;
use rand::Rng;

use super::{InsertionCursor, KeyPool, StopSignal, ThreadStats};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The store returned the identity recorded for the key.
    Match,
    /// The store had no entry for a key believed inserted.
    Miss,
    /// The store returned the identity of a different key.
    Mismatch { index: usize, found: Identity },
}

/// Samples already inserted keys at random and checks the store's answer.
pub struct Reader<'a, S: ?Sized, R> {
    pool: &'a KeyPool,
    store: &'a S,
    cursor: &'a InsertionCursor,
    stats: &'a ThreadStats,
    rng: R,
}

impl<'a, S, R> Reader<'a, S, R>
where
    S: Store + ?Sized,
    R: Rng,
{
    pub fn new(
        pool: &'a KeyPool,
        store: &'a S,
        cursor: &'a InsertionCursor,
        stats: &'a ThreadStats,
        rng: R,
    ) -> Self {
        Self {
            pool,
            store,
            cursor,
            stats,
            rng,
        }
    }

    /// Performs one lookup. Returns `None` without touching the store while nothing has been
    /// inserted yet.
    pub fn read_one(&mut self) -> Option<ReadOutcome> {
        let bound = self.cursor.sample_bound(self.pool.len());
        if bound == 0 {
            return None;
        }

        let index = self.rng.gen_range(0..bound);
        let record = self.pool.get(index)?;

        self.stats.record_op();

        let outcome = match self.store.find(record.key()) {
            None => ReadOutcome::Miss,
            Some(found) if found == record.identity() => ReadOutcome::Match,
            Some(found) if self.pool.is_alias(index, found) => ReadOutcome::Match,
            Some(found) => ReadOutcome::Mismatch { index, found },
        };

        match outcome {
            ReadOutcome::Match => self.stats.record_success(),
            ReadOutcome::Miss => self.stats.record_miss(),
            ReadOutcome::Mismatch { index, found } => {
                error!(
                    "[reader{}] mismatch for key {}: expected {}, found {}",
                    self.stats.id(),
                    index,
                    record.identity(),
                    found
                );
                self.stats.record_mismatch();
            }
        }

        Some(outcome)
    }

    /// Reads until `stop` is raised.
    pub fn run(&mut self, stop: &StopSignal) {
        while !stop.is_stopped() {
            if self.read_one().is_none() {
                thread::yield_now();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, StatsSnapshot};
    use kv_store::{InsertStatus, ShardedStore};
    use rand::prelude::{SeedableRng, StdRng};
    use std::sync::Arc;

    /// Answers every find with the same identity.
    struct ConstantStore(Identity);

    impl Store for ConstantStore {
        fn init(_capacity_hint: usize) -> Self {
            Self(Identity::from_raw(0))
        }

        fn insert(&self, _key: Arc<[u8]>, _value: Identity) -> InsertStatus {
            InsertStatus::Inserted
        }

        fn find(&self, _key: &[u8]) -> Option<Identity> {
            Some(self.0)
        }

        fn len(&self) -> usize {
            1
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_reader_waits_for_first_insert() {
        let pool = KeyPool::from_keys(["duck", "goose"]);
        let store = ShardedStore::init(2);
        let cursor = InsertionCursor::new();
        let stats = ThreadStats::new(Role::Reader, 0);
        let mut reader = Reader::new(&pool, &store, &cursor, &stats, rng());

        assert_eq!(reader.read_one(), None);
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_reader_matches_inserted_keys() {
        let pool = KeyPool::from_keys(["duck", "goose", "swan"]);
        let store = ShardedStore::init(4);
        let cursor = InsertionCursor::new();
        let stats = ThreadStats::new(Role::Reader, 0);

        for record in pool.records() {
            store.insert(record.key().clone(), record.identity());
            cursor.advance();
        }

        let mut reader = Reader::new(&pool, &store, &cursor, &stats, rng());
        for _ in 0..100 {
            assert_eq!(reader.read_one(), Some(ReadOutcome::Match));
        }

        assert_eq!(stats.snapshot().successes, 100);
        assert_eq!(stats.snapshot().ops, 100);
    }

    #[test]
    fn test_reader_counts_miss() {
        let pool = KeyPool::from_keys(["duck"]);
        let store = ShardedStore::init(1);
        let cursor = InsertionCursor::new();
        let stats = ThreadStats::new(Role::Reader, 0);

        cursor.advance();

        let mut reader = Reader::new(&pool, &store, &cursor, &stats, rng());

        assert_eq!(reader.read_one(), Some(ReadOutcome::Miss));
        assert_eq!(stats.snapshot().misses, 1);
        assert_eq!(stats.snapshot().successes, 0);
    }

    #[test]
    fn test_reader_detects_mismatch() {
        let pool = KeyPool::from_keys(["duck", "goose"]);
        let wrong = pool.get(1).unwrap().identity();
        let store = ConstantStore(wrong);
        let cursor = InsertionCursor::new();
        let stats = ThreadStats::new(Role::Reader, 4);

        cursor.advance();

        let mut reader = Reader::new(&pool, &store, &cursor, &stats, rng());

        assert_eq!(
            reader.read_one(),
            Some(ReadOutcome::Mismatch {
                index: 0,
                found: wrong
            })
        );
        assert_eq!(stats.snapshot().mismatches, 1);
    }

    #[test]
    fn test_duplicate_key_value_is_not_a_mismatch() {
        let pool = KeyPool::from_keys(["duck", "duck"]);
        let store = ShardedStore::init(2);
        let cursor = InsertionCursor::new();
        let stats = ThreadStats::new(Role::Reader, 0);

        for record in pool.records() {
            store.insert(record.key().clone(), record.identity());
            cursor.advance();
        }

        let mut reader = Reader::new(&pool, &store, &cursor, &stats, rng());
        for _ in 0..50 {
            assert_eq!(reader.read_one(), Some(ReadOutcome::Match));
        }

        assert_eq!(stats.snapshot().mismatches, 0);
    }

    #[test]
    fn test_reader_stops_on_signal() {
        let pool = KeyPool::from_keys(Vec::<&str>::new());
        let store = ShardedStore::init(0);
        let cursor = InsertionCursor::new();
        let stats = ThreadStats::new(Role::Reader, 0);
        let stop = StopSignal::new();

        std::thread::scope(|s| {
            s.spawn(|| Reader::new(&pool, &store, &cursor, &stats, rng()).run(&stop));
            stop.wait_timeout(std::time::Duration::from_millis(10));
            stop.stop();
        });

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }
}
