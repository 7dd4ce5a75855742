// MTC codec: shared test helpers.
//
// SPDX-License-Identifier: Apache-2.0

//! Small helpers shared by this crate's and `mtc`'s test suites. Kept
//! public (rather than `#[cfg(test)]`-gated) so downstream crates in the
//! workspace can reuse them without duplicating boilerplate, matching how
//! `strict_encoding::test_helpers` exposes its round-trip macros.

use std::io;

use crate::{deserialize, Decode, Encode, Skip};

/// Asserts that encoding `value` then decoding the result reproduces a value
/// that encodes back to the same bytes. Does not require `T: PartialEq`,
/// since not every wire type derives it (and comparing encodings is exactly
/// what "round trip" means for a deterministic codec).
pub fn assert_round_trips<T: Encode + Decode>(value: &T) -> Vec<u8> {
    let bytes = value.to_vec();
    let decoded: T = deserialize(&bytes).expect("round trip: decode");
    let re_encoded = decoded.to_vec();
    assert_eq!(bytes, re_encoded, "round trip: re-encoding produced different bytes");
    bytes
}

/// Asserts that [`Skip::skip`] advances a reader exactly as far as
/// [`Decode::decode`] would, for a stream holding one encoded `T` followed
/// by arbitrary trailing bytes.
pub fn assert_skip_matches_decode<T: Encode + Decode + Skip>(value: &T, trailing: &[u8]) {
    let mut stream = value.to_vec();
    stream.extend_from_slice(trailing);

    let mut via_skip = io::Cursor::new(stream.clone());
    T::skip(&mut via_skip).expect("skip");

    let mut via_decode = io::Cursor::new(stream);
    T::decode(&mut via_decode).expect("decode");

    assert_eq!(
        via_skip.position(),
        via_decode.position(),
        "skip and decode disagree about the encoded length"
    );
}

/// Decodes `bytes` as `T`, asserting that the whole slice is consumed.
pub fn decode_exact<T: Decode>(bytes: &[u8]) -> T {
    deserialize(bytes).expect("decode_exact: decoding failed")
}
