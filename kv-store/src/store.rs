use std::fmt;
use std::sync::Arc;

/// An opaque token identifying the record a value was inserted for. Two identities are equal only
/// when they were taken from the same allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identity(usize);

impl Identity {
    pub fn of(key: &Arc<[u8]>) -> Self {
        Self(Arc::as_ptr(key) as *const u8 as usize)
    }

    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn into_raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertStatus {
    Inserted,
    AlreadyPresentReplaced,
    Failed(String),
}

impl InsertStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, InsertStatus::Failed(_))
    }
}

impl fmt::Display for InsertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertStatus::Inserted => write!(f, "inserted"),
            InsertStatus::AlreadyPresentReplaced => write!(f, "replaced"),
            InsertStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// A key-value store that may be shared between threads. Implementations provide their own
/// admission control between concurrent inserts and finds.
pub trait Store: Send + Sync {
    fn init(capacity_hint: usize) -> Self
    where
        Self: Sized;

    fn insert(&self, key: Arc<[u8]>, value: Identity) -> InsertStatus;

    fn find(&self, key: &[u8]) -> Option<Identity>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A store without any internal concurrency control. It can only be shared once wrapped, see
/// [`RwLocked`](crate::RwLocked).
pub trait UnsyncStore: Send + Sync {
    fn init(capacity_hint: usize) -> Self
    where
        Self: Sized;

    fn insert(&mut self, key: Arc<[u8]>, value: Identity) -> InsertStatus;

    fn find(&self, key: &[u8]) -> Option<Identity>;

    fn len(&self) -> usize;
}
