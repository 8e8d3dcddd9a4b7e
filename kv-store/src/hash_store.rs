use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::{Identity, InsertStatus, UnsyncStore};

/// `std::collections::HashMap` as a store. It has no concurrency control of its own.
#[derive(Debug, Default)]
pub struct HashStore {
    entries: HashMap<Arc<[u8]>, Identity>,
}

impl HashStore {
    /// Like [`UnsyncStore::init`], but reports a failed allocation instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut entries = HashMap::new();
        entries
            .try_reserve(capacity)
            .with_context(|| format!("Failed to allocate a store of {} entries", capacity))?;

        Ok(Self { entries })
    }
}

impl UnsyncStore for HashStore {
    fn init(capacity_hint: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity_hint),
        }
    }

    fn insert(&mut self, key: Arc<[u8]>, value: Identity) -> InsertStatus {
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
        self.entries.get(key).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
