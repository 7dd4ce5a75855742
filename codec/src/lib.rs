// MTC codec: deterministic big-endian binary serialization for Merkle Tree
// Certificates.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2026 following the LNP/BP client-side-validation family of
// strict/confined encoding crates (strict_encoding, confined_encoding).

// Coding conventions
#![deny(dead_code, missing_docs, unused_mut, unused_imports)]

//! Implements the binary codec underlying Merkle Tree Certificates: a
//! bit-exact, big-endian, schema-less wire format for integers, fixed byte
//! arrays, length-prefixed opaque byte strings, length-prefixed typed
//! vectors (where the length prefix counts *bytes*, not elements), ordered
//! structs and tagged-union variants.
//!
//! Every wire type implements [`Encode`] and [`Decode`]; most additionally
//! implement [`Skip`], which advances a reader past one encoded value
//! without fully decoding it, and is used for random access into files of
//! homogeneous records. Validation of type invariants (sorted lists,
//! in-range lengths, well-formed DNS names, ...) happens inside each type's
//! constructor, which makes every value that exists already valid; decoding
//! therefore re-validates on every construction from untrusted bytes unless
//! [`set_validation_enabled`] has been turned off for bulk, trusted-input
//! batch generation.

#[macro_use]
extern crate amplify;

mod primitives;
mod vector;
mod enums;
mod variant;
pub mod test_helpers;

pub use primitives::ByteArray;
pub use vector::{OpaqueVector, Vector};
pub use variant::Wrapped;

use std::io;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide switch controlling whether constructors run [`Error`]-raising
/// validation at all. Defaults to enabled. Intended to be flipped off exactly
/// once, at process start, to accelerate bulk issuance of a batch whose
/// inputs are already known-good; it must never be flipped after any value
/// has been decoded from untrusted input, since in-flight decoders on other
/// threads would then silently skip validation of attacker-controlled bytes.
static VALIDATION_ENABLED: AtomicBool = AtomicBool::new(true);

/// Returns whether constructor-time validation is currently enabled.
#[inline]
pub fn validation_enabled() -> bool { VALIDATION_ENABLED.load(Ordering::Relaxed) }

/// Globally enables or disables constructor-time validation. See
/// [`VALIDATION_ENABLED`] for the safety caveat: call this only at process
/// startup, before decoding any untrusted bytes.
pub fn set_validation_enabled(enabled: bool) { VALIDATION_ENABLED.store(enabled, Ordering::Relaxed); }

/// Serializes a value with the given [`Encode`] implementation and returns
/// an owned byte buffer.
pub fn serialize(value: &impl Encode) -> Vec<u8> { value.to_vec() }

/// Deserializes a value from a byte slice, failing unless the slice is
/// consumed exactly.
pub fn deserialize<T: Decode>(data: &[u8]) -> Result<T, Error> {
    let mut cursor = io::Cursor::new(data);
    let value = T::decode(&mut cursor)?;
    if cursor.position() as usize != data.len() {
        return Err(Error::DataNotEntirelyConsumed);
    }
    Ok(value)
}

/// Binary encoding of a wire type according to the rules in this crate's
/// module documentation. Encoding a given value is deterministic: repeated
/// calls to [`Encode::encode`] on the same value yield identical bytes.
pub trait Encode {
    /// Writes the value's wire encoding to `w`.
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error>;

    /// Convenience wrapper around [`Encode::encode`] that serializes into a
    /// freshly allocated buffer.
    fn to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf).expect("in-memory write cannot fail");
        buf
    }
}

/// Binary decoding counterpart to [`Encode`]. Implementations consume
/// exactly the bytes that make up one value and leave the reader positioned
/// immediately after it.
pub trait Decode: Sized {
    /// Reads one value from `r`, advancing `r` past exactly its encoding.
    fn decode(r: &mut impl io::Read) -> Result<Self, Error>;
}

/// Advances a reader past one encoded value without fully decoding its
/// contents. For opaque vectors and byte-budget vectors this means reading
/// the length prefix and seeking past that many bytes; for structs it means
/// recursively skipping each field in order. Types with a union-typed field
/// (tagged variants wrapped in an opaque container) must seek past the
/// outer container rather than recursing into the union, since the
/// concrete arm cannot be known without first inspecting the tag.
pub trait Skip {
    /// Skips one encoded value, leaving `r` positioned just past it.
    fn skip(r: &mut impl io::Read) -> Result<(), Error>;
}

/// Values whose invariants (sorted order, length bounds, well-formedness)
/// can be checked independently of encoding/decoding. Constructors call
/// [`Validate::validate`] before returning so that every observable value
/// is already valid; [`Decode`] implementations call it again after parsing
/// untrusted bytes, unless [`validation_enabled`] is false.
pub trait Validate {
    /// Checks this value's invariants, returning [`Error::Validation`] with
    /// a description of the first violation found.
    fn validate(&self) -> Result<(), Error>;
}

/// Errors raised while encoding, decoding, or constructing a codec value.
#[derive(Clone, PartialEq, Eq, Debug, Display, From, Error)]
#[display(doc_comments)]
pub enum Error {
    /// I/O error during encoding or decoding: {0}
    #[from(io::Error)]
    Io(IoErrorKind),

    /// parsing error in byte range {0}..{1}: {2}
    Parsing(usize, usize, String),

    /// validation error: {0}
    Validation(String),

    /// value `{2}` for `{0}` is out of the representable range {1:?}
    ValueOutOfRange(&'static str, Range<u128>, u128),

    /// unknown value `{1}` for enum `{0}`
    EnumValueNotKnown(&'static str, u64),

    /// data were not consumed entirely while decoding
    DataNotEntirelyConsumed,

    /// vector length {0} exceeds the maximum of {1} bytes
    ExceedsMaxLength(usize, usize),
}

/// Clone of [`std::io::ErrorKind`] plus the formatted message, so that
/// [`Error`] can implement `Clone`/`PartialEq`/`Eq`, which `std::io::Error`
/// itself does not. Plays the same role `amplify::IoError` plays in
/// `confined_encoding::Error`, reimplemented locally rather than pulled in
/// from `amplify` since this crate only needs the one field pair.
#[derive(Clone, PartialEq, Eq, Debug, Display)]
#[display("{kind:?}: {message}")]
pub struct IoErrorKind {
    /// The underlying [`std::io::ErrorKind`].
    pub kind: io::ErrorKind,
    /// The formatted underlying error message.
    pub message: String,
}

impl From<io::Error> for IoErrorKind {
    fn from(e: io::Error) -> Self {
        IoErrorKind { kind: e.kind(), message: e.to_string() }
    }
}

impl Error {
    /// Constructs a [`Error::Parsing`] error for the byte range `[start, end)`.
    pub fn parsing(start: usize, end: usize, reason: impl Into<String>) -> Self {
        Error::Parsing(start, end, reason.into())
    }

    /// Constructs a [`Error::Validation`] error.
    pub fn validation(reason: impl Into<String>) -> Self { Error::Validation(reason.into()) }
}
