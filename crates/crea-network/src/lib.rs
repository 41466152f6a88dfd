//! # crea-network
//!
//! P2P networking layer for the Creativecoin blockchain.
//!
//! This crate provides:
//! - Wire-protocol frame encoding and decoding
//! - A per-peer incremental stream parser
//! - Protocol message codecs
//! - Seed-based peer discovery
//! - TCP connection management

mod codec;
mod connection;
pub mod discovery;
mod error;
mod message;
mod parser;

pub use codec::{FrameCodec, FrameHeader, COMMAND_SIZE, HEADER_SIZE};
pub use connection::{Connection, ConnectionConfig};
pub use discovery::{seeds, PeerDiscovery, MAINNET_SEEDS, TESTNET_SEEDS};
pub use error::{NetworkError, NetworkResult};
pub use message::{InvItem, InvType, Message, NetAddress, VersionMessage, MAX_ADDR, MAX_INV};
pub use parser::{Parser, ParserEvent};

/// Maximum payload size a frame may declare, in bytes.
pub const MAX_MESSAGE: usize = 4_000_000;

/// Protocol version advertised in `version` messages.
pub const PROTOCOL_VERSION: u32 = 70_015;

/// Service bits advertised by a full node.
pub const SERVICES_NETWORK: u64 = 1;

/// User agent advertised in `version` messages.
pub const USER_AGENT: &str = "/crea-rust:0.1.0/";
