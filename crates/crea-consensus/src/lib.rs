//! # crea-consensus
//!
//! Consensus rules for the Creativecoin blockchain.
//!
//! This crate provides:
//! - Compact-bits target encoding and decoding
//! - Dual Proof-of-Work verification (SHA-256d legacy, Keccak-256)
//! - The block subsidy schedule
//! - Version-bits soft-fork signaling checks
//! - Network descriptors (mainnet, testnet, regtest)
//!
//! Everything here is pure computation: no I/O, no locks, no shared mutable
//! state. All functions are freely callable from any thread.
//!
//! ## Dual PoW
//!
//! Creativecoin blocks are hashed with double SHA-256 until a block signals
//! the new PoW version, after which Keccak-256 is used. Each algorithm has
//! its own network-specific upper target limit. [`verify_pow`] is agnostic to
//! which hash function produced the digest it is given; callers must hash the
//! header under the algorithm the block version selects.

mod compact;
mod hash;
mod network;
mod pow;
mod subsidy;

pub use compact::{compact_to_target, target_to_compact};
pub use hash::{checksum, keccak256, sha256d};
pub use network::{Network, NetworkType, UnknownNetwork};
pub use pow::{has_bit, verify_pow, PowBlock};
pub use subsidy::{block_subsidy, PREMINE_REWARD};

/// Creativecoin consensus constants.
pub mod params {
    /// One coin in satoshis.
    pub const COIN: u64 = 100_000_000;

    /// Maximum amount of money that can ever exist, in satoshis.
    pub const MAX_MONEY: u64 = 115_000_000 * COIN;

    /// Base block reward before the Fibonacci schedule applies.
    pub const BASE_REWARD: u64 = 50 * COIN;

    /// Half of the base reward.
    pub const HALF_REWARD: u64 = BASE_REWARD / 2;

    /// Maximum serialized block size in bytes.
    pub const MAX_BLOCK_SIZE: usize = 4_000_000;

    /// Maximum raw (pre-deserialization) block size in bytes.
    pub const MAX_RAW_BLOCK_SIZE: usize = 4_000_000;

    /// Maximum block weight.
    pub const MAX_BLOCK_WEIGHT: usize = 4_000_000;

    /// Maximum legacy signature operations per block.
    pub const MAX_BLOCK_SIGOPS: usize = 20_000;

    /// Maximum signature operation cost per block.
    pub const MAX_BLOCK_SIGOPS_COST: usize = 80_000;

    /// Version-bits top prefix signaling BIP9-style soft-fork deployment.
    pub const VERSION_TOP_BITS: u32 = 0x2000_0000;

    /// Mask extracting the version-bits top nibble.
    pub const VERSION_TOP_MASK: u32 = 0xE000_0000;

    /// Number of confirmations before a coinbase output can be spent.
    pub const COINBASE_MATURITY: u32 = 8;

    /// Scale factor relating block size to block weight.
    pub const WITNESS_SCALE_FACTOR: usize = 4;

    /// Locktime values at or above this threshold are interpreted as
    /// timestamps rather than block heights.
    pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

    /// Sequence bit disabling relative locktime.
    pub const SEQUENCE_DISABLE_FLAG: u32 = 1 << 31;

    /// Sequence bit selecting time-based relative locktime.
    pub const SEQUENCE_TYPE_FLAG: u32 = 1 << 22;

    /// Granularity shift for time-based relative locktimes (512 seconds).
    pub const SEQUENCE_GRANULARITY: u32 = 9;

    /// Mask extracting the relative locktime value from a sequence.
    pub const SEQUENCE_MASK: u32 = 0x0000_FFFF;

    /// Maximum script size in bytes.
    pub const MAX_SCRIPT_SIZE: usize = 10_000;

    /// Maximum script stack depth.
    pub const MAX_SCRIPT_STACK: usize = 1_000;

    /// Maximum size of a single script push in bytes.
    pub const MAX_SCRIPT_PUSH: usize = 520;

    /// Maximum non-push opcodes per script.
    pub const MAX_SCRIPT_OPS: usize = 201;

    /// Maximum public keys in a CHECKMULTISIG.
    pub const MAX_MULTISIG_PUBKEYS: usize = 20;

    /// Timestamp at which BIP16 (P2SH) activated.
    pub const BIP16_TIME: u64 = 1_333_238_400;
}
