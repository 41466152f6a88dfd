//! Block subsidy schedule.
//!
//! The first two blocks carry the premine. From height 2 the subsidy follows
//! a Fibonacci progression: the per-block reward walks up the sequence
//! 1, 1, 2, 3, 5, ..., 55 and back down to 1, with each band ending at a
//! consecutive Fibonacci-numbered height. Emission stops entirely after
//! height 24,157,817.

use crate::params::COIN;

/// Reward granted to each of the first two blocks.
pub const PREMINE_REWARD: u64 = 12_226_641 * COIN;

/// Subsidy bands as `(last height of band, reward in whole coins)`.
/// Band boundaries are consecutive Fibonacci numbers.
const SUBSIDY_BANDS: &[(u32, u64)] = &[
    (6_765, 1),
    (10_946, 1),
    (17_711, 2),
    (28_657, 3),
    (46_368, 5),
    (75_025, 8),
    (121_393, 13),
    (196_418, 21),
    (317_811, 34),
    (514_229, 55),
    (832_040, 34),
    (1_346_269, 21),
    (2_178_309, 13),
    (3_524_578, 8),
    (5_702_887, 5),
    (9_227_465, 3),
    (14_930_352, 2),
    (24_157_817, 1),
];

/// Subsidy for the block at the given height, in satoshis.
///
/// Heights 0 and 1 receive the premine; past the final band the subsidy is
/// zero and the money supply is fixed.
pub fn block_subsidy(height: u32) -> u64 {
    if height <= 1 {
        return PREMINE_REWARD;
    }

    for &(last, coins) in SUBSIDY_BANDS {
        if height <= last {
            return coins * COIN;
        }
    }

    0
}
