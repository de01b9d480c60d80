//! Deterministic per-matchup perturbation.
//!
//! A single linear-congruential step over a seed built from the two roster
//! ids. Not a PRNG: the same pair always yields the same value, and swapping
//! the pair flips its sign.

use crate::cli::types::RosterId;

pub const LCG_MULTIPLIER: u64 = 1_103_515_245;
pub const LCG_INCREMENT: u64 = 12_345;
pub const LCG_MODULUS: u64 = 1 << 31;

/// Largest perturbation applied to a win probability.
pub const PERTURBATION_MAGNITUDE: f64 = 0.01;

/// One LCG step: `(seed * 1103515245 + 12345) mod 2^31`.
pub fn lcg_step(seed: u64) -> u64 {
    seed.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT) % LCG_MODULUS
}

/// Order-independent seed for a pair of rosters.
pub fn pair_seed(a: RosterId, b: RosterId) -> u64 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    u64::from(low.as_u32()) * 1000 + u64::from(high.as_u32())
}

/// Signed offset in `[-magnitude, magnitude)` for `a` playing `b`.
pub fn pair_perturbation(a: RosterId, b: RosterId, magnitude: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    let unit = lcg_step(pair_seed(a, b)) as f64 / LCG_MODULUS as f64;
    let value = (unit * 2.0 - 1.0) * magnitude;
    if a < b {
        value
    } else {
        -value
    }
}
