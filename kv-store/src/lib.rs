mod hash_store;
mod kind;
mod locked;
mod sharded;
mod store;

pub use hash_store::*;
pub use kind::*;
pub use locked::*;
pub use sharded::*;
pub use store::*;
