// Merkle Tree Certificates: assertion schema, tree builder, validity window
// and certificate verifier.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2026 following the LNP/BP client-side-validation family of
// crates, adapted to the IETF Merkle Tree Certificates draft's data model.

// Coding conventions
#![deny(dead_code, missing_docs, unused_mut, unused_imports)]

//! Implements the domain layer of Merkle Tree Certificates on top of the
//! [`mtc_codec`] wire format: the assertion/claim schema ([`assertion`]),
//! distinguisher-tagged SHA-256 tree hashing ([`hash`]), the level-by-level
//! Merkle tree builder and proof extractor ([`merkle`]), Ed25519-signed
//! sliding validity windows ([`window`]), and certificate composition and
//! verification ([`certificate`]). [`batch`] bundles these into the
//! external-facing issuance/persistence API; [`error`] is the crate's
//! error type.
//!
//! An issuer's workflow is: build a tree over a batch of assertions
//! ([`merkle::create_merkle_tree`]), sign its root into the sliding window
//! ([`window::create_signed_validity_window`]), extract one inclusion
//! proof per assertion ([`merkle::create_merkle_tree_proof`]), and
//! assemble each into a [`certificate::BikeshedCertificate`]. A relying
//! party verifies one with [`certificate::verify_certificate`] against the
//! signed window and the issuer's known public key.

#[macro_use]
extern crate amplify;

pub mod assertion;
pub mod batch;
pub mod certificate;
pub mod error;
pub mod hash;
pub mod ip;
pub mod merkle;
pub mod window;

pub use error::{Error, VerificationError};
