//! Hashing primitives used by consensus and the wire protocol.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Double SHA-256 over a byte slice.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Frame checksum: the first four bytes of [`sha256d`], read little-endian.
pub fn checksum(data: &[u8]) -> u32 {
    let digest = sha256d(data);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Keccak-256 over a byte slice.
///
/// This is the original Keccak padding, not the NIST SHA-3 variant.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}
