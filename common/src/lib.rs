pub mod config;
pub mod rng;

pub use config::*;
pub use rng::*;
