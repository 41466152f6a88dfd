//! Compact-bits target encoding.
//!
//! Block headers carry the PoW target in a 32-bit packed form:
//!
//! ```text
//! +----------+------+----------------------+
//! | exponent | sign |       mantissa       |
//! |  8 bits  | 1 bit|       23 bits        |
//! +----------+------+----------------------+
//! ```
//!
//! The encoded value is `mantissa * 256^(exponent - 3)` when the exponent
//! exceeds 3, otherwise the mantissa shifted right accordingly. The sign bit
//! never occurs in valid targets but must round-trip; encoding normalizes the
//! mantissa so its own high bit cannot collide with the sign position.

use num_bigint::{BigInt, Sign};
use num_traits::Zero;

/// Sign bit position within the compact form.
const COMPACT_SIGN_BIT: u32 = 0x0080_0000;

/// Mask extracting the 23-bit mantissa.
const COMPACT_MANTISSA_MASK: u32 = 0x007f_ffff;

/// Decode a compact-bits value into a target.
///
/// The function is total: any `u32` decodes to some integer, including
/// negative ones when the sign bit is set and zero for a zero mantissa.
/// Callers must reject non-positive targets before using them for PoW.
pub fn compact_to_target(compact: u32) -> BigInt {
    let exponent = (compact >> 24) as usize;
    let negative = compact & COMPACT_SIGN_BIT != 0;
    let mantissa = compact & COMPACT_MANTISSA_MASK;

    let target = if exponent <= 3 {
        BigInt::from(mantissa >> (8 * (3 - exponent)))
    } else {
        BigInt::from(mantissa) << (8 * (exponent - 3))
    };

    if negative && !target.is_zero() {
        -target
    } else {
        target
    }
}

/// Encode a target into compact-bits form.
///
/// Zero encodes to `0`. If the mantissa's high bit would be set, the mantissa
/// is shifted right one byte and the exponent incremented so the sign bit
/// stays unambiguous. Values wider than three bytes lose their low-order
/// bytes; [`compact_to_target`] followed by `target_to_compact` is exact.
pub fn target_to_compact(num: &BigInt) -> u32 {
    if num.is_zero() {
        return 0;
    }

    let (sign, bytes) = num.to_bytes_be();
    let mut exponent = bytes.len() as u32;

    let mut mantissa = if bytes.len() <= 3 {
        let mut word = 0u32;
        for (i, &b) in bytes.iter().enumerate() {
            word |= (b as u32) << (8 * (2 - i));
        }
        word
    } else {
        ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32)
    };

    if mantissa & COMPACT_SIGN_BIT != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    let mut compact = (exponent << 24) | mantissa;
    if sign == Sign::Minus {
        compact |= COMPACT_SIGN_BIT;
    }
    compact
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn test_zero_roundtrip() {
        assert_eq!(compact_to_target(0), BigInt::from(0));
        assert_eq!(target_to_compact(&BigInt::from(0)), 0);
    }

    #[test]
    fn test_mainnet_genesis_bits() {
        // 0x1d00ffff decodes to 0xffff followed by 26 zero bytes.
        let target = compact_to_target(0x1d00ffff);
        let expected = BigInt::from(0xffffu32) << (8 * 26);
        assert_eq!(target, expected);
        assert_eq!(target_to_compact(&target), 0x1d00ffff);
    }

    #[test]
    fn test_regtest_bits() {
        let target = compact_to_target(0x207fffff);
        let expected = BigInt::from(0x7fffffu32) << (8 * 29);
        assert_eq!(target, expected);
        assert_eq!(target_to_compact(&target), 0x207fffff);
    }

    #[test]
    fn test_small_exponents() {
        // exponent <= 3 shifts the mantissa right instead of left.
        assert_eq!(compact_to_target(0x03123456), BigInt::from(0x123456));
        assert_eq!(compact_to_target(0x02123456), BigInt::from(0x1234));
        assert_eq!(compact_to_target(0x01120000), BigInt::from(0x12));
        assert_eq!(compact_to_target(0x00120000), BigInt::from(0));
    }

    #[test]
    fn test_sign_bit_decodes_negative() {
        let target = compact_to_target(0x1d80ffff);
        assert_eq!(target.sign(), Sign::Minus);
        assert_eq!(-target, BigInt::from(0xffffu32) << (8 * 26));
    }

    #[test]
    fn test_negative_roundtrip() {
        let num: BigInt = -(BigInt::from(0xffffu32) << (8usize * 26));
        let compact = target_to_compact(&num);
        assert_eq!(compact, 0x1d80ffff);
        assert_eq!(compact_to_target(compact), num);
    }

    #[test]
    fn test_mantissa_normalization() {
        // A leading byte >= 0x80 must not land on the sign bit.
        let num = BigInt::from(0x80u32) << (8 * 2);
        let compact = target_to_compact(&num);
        assert_eq!(compact, 0x04008000);
        assert_eq!(compact_to_target(compact), num);
    }

    #[test]
    fn test_roundtrip_various_widths() {
        for shift in [0usize, 8, 16, 24, 64, 128, 200, 224] {
            let num = BigInt::from(0x1234u32) << shift;
            let compact = target_to_compact(&num);
            assert_eq!(compact_to_target(compact), num, "shift {}", shift);
        }
    }

    #[test]
    fn test_truncation_is_byte_aligned() {
        // Low-order bytes beyond the three-byte mantissa are dropped.
        let num = BigInt::from(BigUint::parse_bytes(b"123456789abc", 16).unwrap());
        let compact = target_to_compact(&num);
        let recovered = compact_to_target(compact);
        assert_eq!(recovered, BigInt::from(0x123456u64) << (8 * 3));
    }
}
