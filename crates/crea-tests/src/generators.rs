//! Proptest strategies for core types.

use num_bigint::BigInt;
use proptest::prelude::*;

/// Arbitrary block heights, covering the whole emission schedule and beyond.
pub fn arb_height() -> impl Strategy<Value = u32> {
    0u32..=30_000_000
}

/// Arbitrary normalized compact-bits values.
///
/// Exponent at least 3 and a mantissa with a nonzero top byte below 0x80:
/// exactly the encodings `target_to_compact` itself produces, so decoding
/// and re-encoding must reproduce them bit for bit.
pub fn arb_normalized_compact() -> impl Strategy<Value = u32> {
    (3u32..=32, 0x01_0000u32..=0x7f_ffff)
        .prop_map(|(exponent, mantissa)| (exponent << 24) | mantissa)
}

/// Arbitrary targets representable in compact form: a three-byte mantissa
/// scaled by a whole number of bytes.
pub fn arb_representable_target() -> impl Strategy<Value = BigInt> {
    (1u32..=0x7f_ffff, 0usize..=29)
        .prop_map(|(mantissa, shift)| BigInt::from(mantissa) << (8 * shift))
}

/// Arbitrary frame payloads, small enough to keep cases fast.
pub fn arb_payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=64)
}

/// Arbitrary commands the message layer has no codec for.
pub fn arb_unknown_command() -> impl Strategy<Value = String> {
    "[a-z]{1,11}".prop_filter("must not collide with a known codec", |cmd| {
        !matches!(
            cmd.as_str(),
            "version" | "verack" | "ping" | "pong" | "getaddr" | "addr" | "inv" | "getdata"
        )
    })
}

/// Split points partitioning a buffer of the given length.
pub fn arb_split_points(len: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..=len, 0..=6).prop_map(|mut points| {
        points.sort_unstable();
        points.dedup();
        points
    })
}

/// Feed a byte stream in the chunks described by split points.
pub fn chunks<'a>(bytes: &'a [u8], points: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for &point in points {
        chunks.push(&bytes[start..point]);
        start = point;
    }
    chunks.push(&bytes[start..]);
    chunks
}
