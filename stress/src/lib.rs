pub mod cursor;
pub mod harness;
pub mod keys;
pub mod options;
pub mod reader;
pub mod report;
pub mod signal;
pub mod stats;
pub mod writer;

pub use cursor::*;
pub use harness::*;
pub use keys::*;
pub use options::*;
pub use reader::*;
pub use report::*;
pub use signal::*;
pub use stats::*;
pub use writer::*;
