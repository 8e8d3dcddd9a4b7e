use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

use anyhow::{Context, Result};
use common::create_rng;
use kv_store::Identity;
use log::info;
use rand::distributions::Alphanumeric;
use rand::Rng;

pub const KEY_LEN: RangeInclusive<usize> = 16..=47;

/// A generated key and the identity the harness stores for it.
#[derive(Clone, Debug)]
pub struct KeyRecord {
    key: Arc<[u8]>,
    identity: Identity,
}

impl KeyRecord {
    pub fn new(key: Arc<[u8]>) -> Self {
        let identity = Identity::of(&key);
        Self { key, identity }
    }

    pub fn key(&self) -> &Arc<[u8]> {
        &self.key
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }
}

/// The fixed workload shared read-only by every task. Records never move once the pool is built,
/// so identities stay valid for the lifetime of the pool.
#[derive(Debug)]
pub struct KeyPool {
    records: Box<[KeyRecord]>,
    aliases: HashMap<Arc<[u8]>, Vec<Identity>>,
    seed: Option<u64>,
}

impl KeyPool {
    /// Generates `count` alphanumeric keys with lengths drawn uniformly from [`KEY_LEN`].
    pub fn generate(count: usize, seed: Option<u64>) -> Result<Self> {
        let (mut rng, seed) = create_rng(seed);

        let mut records = Vec::new();
        records
            .try_reserve_exact(count)
            .with_context(|| format!("Failed to allocate a key pool of {} keys", count))?;

        for _ in 0..count {
            let len = rng.gen_range(KEY_LEN);
            let key = (&mut rng)
                .sample_iter(Alphanumeric)
                .take(len)
                .collect::<Vec<u8>>();

            records.push(KeyRecord::new(Arc::from(key.into_boxed_slice())));
        }

        let pool = Self::from_records(records, Some(seed));

        if !pool.aliases.is_empty() {
            info!("Key pool contains {} duplicated keys", pool.aliases.len());
        }

        Ok(pool)
    }

    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        let records = keys
            .into_iter()
            .map(|key| KeyRecord::new(Arc::from(key.as_ref())))
            .collect();

        Self::from_records(records, None)
    }

    fn from_records(records: Vec<KeyRecord>, seed: Option<u64>) -> Self {
        let aliases = find_aliases(&records);

        Self {
            records: records.into_boxed_slice(),
            aliases,
            seed,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KeyRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[KeyRecord] {
        &self.records
    }

    /// The seed the pool was generated from, if it was generated.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether `found` is the identity of another record carrying the same key bytes as the record
    /// at `index`. Such a value is the legitimate current value for the key.
    pub fn is_alias(&self, index: usize, found: Identity) -> bool {
        self.records
            .get(index)
            .and_then(|record| self.aliases.get(record.key()))
            .map_or(false, |identities| identities.contains(&found))
    }
}

fn find_aliases(records: &[KeyRecord]) -> HashMap<Arc<[u8]>, Vec<Identity>> {
    let mut seen: HashSet<&[u8]> = HashSet::with_capacity(records.len());
    let mut duplicated: HashSet<&[u8]> = HashSet::new();

    for record in records {
        if !seen.insert(record.key()) {
            duplicated.insert(record.key());
        }
    }

    drop(seen);

    let mut aliases: HashMap<Arc<[u8]>, Vec<Identity>> = HashMap::with_capacity(duplicated.len());
    for record in records {
        if duplicated.contains(&record.key()[..]) {
            aliases
                .entry(record.key().clone())
                .or_default()
                .push(record.identity());
        }
    }

    aliases
}
