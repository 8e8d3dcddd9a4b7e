use std::sync::Arc;

use anyhow::{anyhow, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{Identity, InsertStatus, Store};

/// A sharded, internally locked map. Needs no extra admission control from the harness.
#[derive(Debug, Default)]
pub struct ShardedStore {
    entries: DashMap<Arc<[u8]>, Identity>,
}

const SHARDS: usize = 64;

impl ShardedStore {
    /// Like [`Store::init`], but reports a failed allocation instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut entries: DashMap<Arc<[u8]>, Identity> = DashMap::with_shard_amount(SHARDS);
        entries
            .try_reserve(capacity.div_ceil(SHARDS))
            .map_err(|_| anyhow!("Failed to allocate a store of {} entries", capacity))?;

        Ok(Self { entries })
    }
}

impl Store for ShardedStore {
    fn init(capacity_hint: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity_hint),
        }
    }

    fn insert(&self, key: Arc<[u8]>, value: Identity) -> InsertStatus {
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(value);
                InsertStatus::AlreadyPresentReplaced
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
                InsertStatus::Inserted
            }
        }
    }

    fn find(&self, key: &[u8]) -> Option<Identity> {
        self.entries.get(key).map(|entry| *entry.value())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
