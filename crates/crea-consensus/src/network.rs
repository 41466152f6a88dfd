//! Network descriptors.
//!
//! A [`Network`] bundles the operational constants that differ between
//! deployments of the chain: the wire-protocol magic tag, the default P2P
//! port, and the upper target limits for both PoW algorithms. Descriptors
//! are immutable once constructed and may be shared freely across threads.

use crate::compact::compact_to_target;
use num_bigint::BigInt;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a network name does not resolve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

/// The deployments of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    /// Production network.
    Mainnet,
    /// Public test network.
    Testnet,
    /// Local regression-test network.
    Regtest,
}

impl NetworkType {
    /// Canonical lowercase name, as used in configuration and seed lookup.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Mainnet => "main",
            NetworkType::Testnet => "testnet",
            NetworkType::Regtest => "regtest",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" | "mainnet" => Ok(NetworkType::Mainnet),
            "testnet" => Ok(NetworkType::Testnet),
            "regtest" => Ok(NetworkType::Regtest),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

/// Network-specific operational constants.
#[derive(Debug, Clone)]
pub struct Network {
    /// Which deployment this descriptor belongs to.
    pub network_type: NetworkType,
    /// Wire-protocol magic tag, serialized little-endian at frame offset 0.
    pub magic: u32,
    /// Default P2P listen port.
    pub default_port: u16,
    /// Compact form of the legacy SHA-256d PoW limit.
    pub pow_bits: u32,
    /// Compact form of the Keccak-256 PoW limit.
    pub keccak_pow_bits: u32,
    /// Decoded legacy PoW limit.
    pow_limit: BigInt,
    /// Decoded Keccak PoW limit.
    keccak_pow_limit: BigInt,
}

impl Network {
    fn new(
        network_type: NetworkType,
        magic: u32,
        default_port: u16,
        pow_bits: u32,
        keccak_pow_bits: u32,
    ) -> Self {
        Self {
            network_type,
            magic,
            default_port,
            pow_bits,
            keccak_pow_bits,
            pow_limit: compact_to_target(pow_bits),
            keccak_pow_limit: compact_to_target(keccak_pow_bits),
        }
    }

    /// Mainnet descriptor.
    pub fn mainnet() -> Self {
        Self::new(NetworkType::Mainnet, 0x63726561, 10946, 0x1d00ffff, 0x1e00ffff)
    }

    /// Testnet descriptor.
    pub fn testnet() -> Self {
        Self::new(NetworkType::Testnet, 0x74637265, 20946, 0x1d00ffff, 0x1e00ffff)
    }

    /// Regtest descriptor. Both limits are the maximum the compact form can
    /// carry without setting the sign bit, so any well-formed block passes.
    pub fn regtest() -> Self {
        Self::new(NetworkType::Regtest, 0x72637265, 30946, 0x207fffff, 0x207fffff)
    }

    /// Resolve a descriptor by network type.
    pub fn get(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
            NetworkType::Regtest => Self::regtest(),
        }
    }

    /// Resolve a descriptor by name.
    pub fn by_name(name: &str) -> Result<Self, UnknownNetwork> {
        name.parse::<NetworkType>().map(Self::get)
    }

    /// Upper target limit for the legacy SHA-256d PoW.
    pub fn pow_limit(&self) -> &BigInt {
        &self.pow_limit
    }

    /// Upper target limit for the Keccak-256 PoW.
    pub fn keccak_pow_limit(&self) -> &BigInt {
        &self.keccak_pow_limit
    }
}
