// Merkle Tree Certificates: crate-level error type.
//
// SPDX-License-Identifier: Apache-2.0

//! Wraps [`mtc_codec::Error`] (wire-level parsing/validation failures) with
//! the two failure modes that only make sense once you are past the wire:
//! a raw Ed25519 signature mismatch, and the seven semantic checks
//! performed by [`verify_certificate`](crate::certificate::verify_certificate),
//! collected in [`VerificationError`]. Shaped the same way as
//! `confined_encoding::Error`: `amplify`'s `Display`/`From`/`Error` derive
//! stack with `#[display(doc_comments)]`, rather than a hand-rolled
//! `impl std::error::Error`.

use std::io;

/// Errors raised anywhere in this crate: wire decoding (delegated to
/// [`mtc_codec::Error`]), filesystem persistence, or certificate
/// verification.
#[derive(Clone, PartialEq, Eq, Debug, Display, From, Error)]
#[display(doc_comments)]
pub enum Error {
    /// codec error: {0}
    #[from]
    Codec(mtc_codec::Error),

    /// I/O error: {0}
    #[from(io::Error)]
    Io(mtc_codec::IoErrorKind),

    /// Ed25519 signature verification failed
    InvalidSignature,

    /// certificate verification failed: {0}
    #[from]
    Verification(VerificationError),
}

impl From<ed25519_dalek::SignatureError> for Error {
    fn from(_: ed25519_dalek::SignatureError) -> Self { Error::InvalidSignature }
}

/// The semantic failure modes of
/// [`verify_certificate`](crate::certificate::verify_certificate), one
/// variant per numbered step in its specification that is not itself a
/// signature or wire-decoding failure.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum VerificationError {
    /// certificate's trust anchor does not use the `merkle_tree_sha256` proof type
    WrongProofType,

    /// certificate's issuer id does not match the expected issuer
    UnrecognizedIssuer,

    /// certificate batch {0} is newer than the signed window's batch {1}
    FromTheFuture(u32, u32),

    /// certificate batch {0} is older than the signed window's batch {1} allows
    Expired(u32, u32),

    /// inclusion path does not lead back to the tree root
    IncorrectPath,

    /// recomputed root does not match the tree head recorded in the signed window
    RootMismatch,
}
