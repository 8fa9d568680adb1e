//! Per-trajectory PRNG sub-seeding (spec §4.6, §9).
//!
//! Each trajectory draws from its own [`rand::rngs::SmallRng`] substream
//! seeded deterministically from `(master_seed, trajectory_index)`, rather
//! than from a shared counter behind a lock — the "derive per-trajectory
//! sub-seeds deterministically… not from a shared counter under a lock"
//! design note of spec §9. `SmallRng` is currently backed by Xoshiro256++,
//! a well-studied, non-cryptographic generator, matching the statistical
//! requirement of §4.6 without paying for cryptographic strength nobody asked for.

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Mix a master seed and a trajectory index into a 64-bit sub-seed
/// (splitmix64's output-mixing step).
fn mix(master_seed: u64, index: u64) -> u64 {
    let mut z = master_seed.wrapping_add(0x9E37_79B9_7F4A_7C15u64.wrapping_mul(index.wrapping_add(1)));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Build the trajectory-local RNG for trajectory `index` under `master_seed`.
pub fn trajectory_rng(master_seed: u64, index: u64) -> SmallRng {
    SmallRng::seed_from_u64(mix(master_seed, index))
}
