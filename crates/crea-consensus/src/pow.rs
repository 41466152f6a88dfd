//! Proof-of-Work verification and version-bits checks.
//!
//! Creativecoin runs a dual PoW scheme: legacy blocks are hashed with double
//! SHA-256, blocks signaling the new PoW version with Keccak-256. Which
//! algorithm produced a digest is invisible here; [`verify_pow`] only picks
//! the matching network limit and compares numbers.

use crate::compact::compact_to_target;
use crate::network::Network;
use crate::params::{VERSION_TOP_BITS, VERSION_TOP_MASK};
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use tracing::trace;

/// Header-level view of a block, as needed by PoW verification.
pub trait PowBlock {
    /// Whether this block signals the Keccak-256 PoW version.
    fn has_new_pow_version(&self) -> bool;
}

/// Verify that a block hash satisfies its claimed compact target.
///
/// The hash is interpreted as a little-endian 256-bit integer. Returns
/// `false` when the decoded target is non-positive, exceeds the network
/// limit for the block's PoW algorithm, or is smaller than the hash.
pub fn verify_pow(network: &Network, block: &impl PowBlock, hash: &[u8; 32], bits: u32) -> bool {
    let target = compact_to_target(bits);

    let pow_limit = if block.has_new_pow_version() {
        network.keccak_pow_limit()
    } else {
        network.pow_limit()
    };

    if target.sign() == Sign::Minus || target.is_zero() {
        return false;
    }

    if &target > pow_limit {
        trace!(bits, "target above network limit");
        return false;
    }

    let num = BigInt::from_bytes_le(Sign::Plus, hash);
    num <= target
}

/// Check whether a block version signals a version-bits deployment.
///
/// True iff the version carries the `VERSION_TOP_BITS` prefix in its top
/// nibble and the given bit is set.
pub fn has_bit(version: u32, bit: u8) -> bool {
    (version & VERSION_TOP_MASK) == VERSION_TOP_BITS && version & (1 << bit) != 0
}
