use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Error, Result};

use super::{HashStore, RwLocked, ShardedStore, Store};

/// The bundled stores the harness can drive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    /// `dashmap` with its own per-shard locking.
    #[default]
    Sharded,
    /// `std` hash map wrapped by the harness in one reader/writer lock.
    Locked,
}

impl StoreKind {
    /// Builds an empty store with room for `capacity_hint` entries. Fails when that much memory
    /// cannot be allocated.
    pub fn build(self, capacity_hint: usize) -> Result<Box<dyn Store>> {
        let store: Box<dyn Store> = match self {
            StoreKind::Sharded => Box::new(ShardedStore::try_with_capacity(capacity_hint)?),
            StoreKind::Locked => Box::new(RwLocked::new(HashStore::try_with_capacity(
                capacity_hint,
            )?)),
        };

        Ok(store)
    }

    pub fn name(self) -> &'static str {
        match self {
            StoreKind::Sharded => "sharded",
            StoreKind::Locked => "locked",
        }
    }
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sharded" => Ok(StoreKind::Sharded),
            "locked" => Ok(StoreKind::Locked),
            other => bail!("Unknown store '{}', expected 'sharded' or 'locked'", other),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
