use log::info;
use rand::prelude::{SeedableRng, StdRng};
use rand::RngCore;

/// Builds a seeded rng. When no seed is given, one is drawn from entropy and logged so that the
/// same run can be reproduced later.
pub fn create_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(|| {
        let seed = rand::thread_rng().next_u64();
        info!("No seed configured, using {}", seed);
        seed
    });

    (StdRng::seed_from_u64(seed), seed)
}

/// Derives an independent rng for a worker so that workers sharing a run seed do not share a
/// sequence.
pub fn create_worker_rng(seed: u64, worker_id: usize) -> StdRng {
    let mixed = seed ^ (worker_id as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mixed)
}
