use kv_store::{InsertStatus, Store};
use log::{info, warn};

use super::{InsertionCursor, KeyPool, ThreadStats};

/// Inserts the whole key pool into the store, once, in pool order.
pub struct Writer<'a, S: ?Sized> {
    pool: &'a KeyPool,
    store: &'a S,
    cursor: &'a InsertionCursor,
    stats: &'a ThreadStats,
}

impl<'a, S> Writer<'a, S>
where
    S: Store + ?Sized,
{
    pub fn new(
        pool: &'a KeyPool,
        store: &'a S,
        cursor: &'a InsertionCursor,
        stats: &'a ThreadStats,
    ) -> Self {
        Self {
            pool,
            store,
            cursor,
            stats,
        }
    }

    /// Inserts the record at `index`. A failed insert is counted and logged; it never ends the
    /// pass.
    ///
    /// Panics if `index` is outside the pool.
    pub fn write_one(&self, index: usize) -> InsertStatus {
        let record = &self.pool.records()[index];

        self.stats.record_op();

        let status = self.store.insert(record.key().clone(), record.identity());

        if status.is_success() {
            self.stats.record_success();
            self.cursor.advance();
        } else {
            warn!(
                "[writer{}] failed to insert key {}: {}",
                self.stats.id(),
                index,
                status
            );
            self.stats.record_failure();
        }

        status
    }

    pub fn run(&self) {
        for index in 0..self.pool.len() {
            self.write_one(index);
        }

        info!(
            "[writer{}] finished its pass over {} keys",
            self.stats.id(),
            self.pool.len()
        );
    }
}
