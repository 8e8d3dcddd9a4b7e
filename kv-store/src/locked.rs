use std::sync::Arc;

use parking_lot::RwLock;

use super::{Identity, InsertStatus, Store, UnsyncStore};

/// Shares an [`UnsyncStore`] behind a single reader/writer lock. Finds run concurrently with each
/// other, inserts are exclusive.
#[derive(Debug)]
pub struct RwLocked<S> {
    inner: RwLock<S>,
}

impl<S> RwLocked<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: RwLock::new(inner),
        }
    }
}

impl<S: UnsyncStore> Store for RwLocked<S> {
    fn init(capacity_hint: usize) -> Self {
        Self::new(S::init(capacity_hint))
    }

    fn insert(&self, key: Arc<[u8]>, value: Identity) -> InsertStatus {
        self.inner.write().insert(key, value)
    }

    fn find(&self, key: &[u8]) -> Option<Identity> {
        self.inner.read().find(key)
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }
}
